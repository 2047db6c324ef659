// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text commands recognized ahead of AI processing.

use chrono::{DateTime, TimeZone};

/// Reply to `!clear`.
pub const CLEARED_TEXT: &str = "✅ Histórico da conversa limpo com sucesso!";

/// Reply to `!ping`.
pub const PONG_TEXT: &str = "🏓 Pong! Bot funcionando perfeitamente!";

/// Chat ids longer than this are truncated in the sessions listing.
const CHAT_ID_PREVIEW: usize = 25;

/// A recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Status,
    Ping,
    Sessions,
}

impl Command {
    /// Matches trimmed, lower-cased text exactly against the command vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "!help" | "!ajuda" => Some(Self::Help),
            "!clear" | "!limpar" => Some(Self::Clear),
            "!status" => Some(Self::Status),
            "!ping" => Some(Self::Ping),
            "!sessions" | "!sessões" | "!stats" => Some(Self::Sessions),
            _ => None,
        }
    }
}

pub fn help_text(bot_name: &str) -> String {
    format!(
        "🤖 *{bot_name}*\n\
         \n\
         *Comandos disponíveis:*\n\
         • !help ou !ajuda - Mostra esta mensagem\n\
         • !clear ou !limpar - Limpa o histórico da conversa\n\
         • !status - Mostra o status do bot\n\
         • !sessions ou !stats - Mostra as estatísticas de execução\n\
         • !ping - Testa se o bot está funcionando\n\
         \n\
         *Como usar:*\n\
         Simplesmente envie uma mensagem normal e eu responderei usando inteligência artificial!"
    )
}

/// Status report with the tracked chat count and a pt-BR formatted time.
pub fn status_text<Tz>(active_chats: usize, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "🤖 *Status do Bot*\n\
         \n\
         ✅ Bot ativo e funcionando\n\
         📊 Conversas ativas: {active_chats}\n\
         🕐 Última atualização: {}",
        now.format("%d/%m/%Y, %H:%M:%S")
    )
}

/// Execution statistics; `stats` pairs chat ids with their successful reply counts.
pub fn sessions_text(stats: &[(String, u64)]) -> String {
    let total: u64 = stats.iter().map(|(_, count)| count).sum();
    let listing = if stats.is_empty() {
        "_Nenhum chat ativo no momento_".to_string()
    } else {
        let lines: Vec<String> = stats
            .iter()
            .map(|(chat_id, count)| {
                let preview: String = chat_id.chars().take(CHAT_ID_PREVIEW).collect();
                format!("• {preview}... ({count})")
            })
            .collect();
        format!("*Chats com workflow ativo:*\n{}", lines.join("\n"))
    };

    format!(
        "📊 *Estatísticas do Workflow*\n\
         \n\
         👥 Chats ativos: {}\n\
         🔄 Total de execuções: {total}\n\
         \n\
         {listing}",
        stats.len()
    )
}
