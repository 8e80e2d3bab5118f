//! Colored terminal badges for the CLI. Everything here writes to stderr so
//! stdout carries only tokens and claims.

use colored::Colorize;

use crate::error::VerifyError;
use crate::token::claims::ClaimSet;

// === Badges ===

fn badge(text: &str, fg: colored::Color, bg: colored::Color) -> colored::ColoredString {
    format!(" {} ", text).color(fg).on_color(bg).bold()
}

fn short_jti(jti: &str) -> &str {
    jti.get(..8).unwrap_or(jti)
}

// === Events ===

pub fn log_issue(subject: &str, issuer: &str, lifetime_seconds: u32) {
    eprintln!(
        "{} {} {} {} {} {}",
        badge("ISSUE", colored::Color::Black, colored::Color::Green),
        "sub:".dimmed(),
        subject.white(),
        "iss:".dimmed(),
        issuer.cyan(),
        format!("ttl:{}s", lifetime_seconds).dimmed()
    );
}

pub fn log_verified(claims: &ClaimSet) {
    eprintln!(
        "{} {} {} {} {} {}",
        badge("VALID", colored::Color::Black, colored::Color::Cyan),
        "sub:".dimmed(),
        claims.sub.white(),
        "iss:".dimmed(),
        claims.iss.cyan(),
        format!("jti:{}", short_jti(&claims.jti)).dimmed()
    );
}

pub fn log_rejected(err: &VerifyError) {
    eprintln!(
        "{} {} {}",
        badge("REJECTED", colored::Color::White, colored::Color::Red),
        err.reason().red().bold(),
        err.to_string().dimmed()
    );
}

pub fn log_failure(message: &str) {
    eprintln!(
        "{} {}",
        badge("ERROR", colored::Color::White, colored::Color::Red),
        message.red()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_jti_truncates_to_eight() {
        assert_eq!(short_jti("0123456789abcdef"), "01234567");
    }

    #[test]
    fn short_jti_keeps_short_values() {
        assert_eq!(short_jti("abc"), "abc");
        assert_eq!(short_jti(""), "");
    }

    #[test]
    fn badge_pads_text() {
        colored::control::set_override(false);
        assert_eq!(
            badge("ISSUE", colored::Color::Black, colored::Color::Green).to_string(),
            " ISSUE "
        );
    }
}
