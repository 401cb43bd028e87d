// src/common/format.rs

//! Formatação pt-BR usada em relatórios, planilhas e documentos.

use chrono::{DateTime, Utc};

/// Formata um valor monetário no padrão brasileiro: `R$ 1.234,56`.
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}

/// Data no formato `dd/mm/aaaa`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Abreviação pt-BR do mês (1 a 12), usada nos rótulos dos gráficos.
pub fn month_abbr_pt(month: u32) -> &'static str {
    match month {
        1 => "jan",
        2 => "fev",
        3 => "mar",
        4 => "abr",
        5 => "mai",
        6 => "jun",
        7 => "jul",
        8 => "ago",
        9 => "set",
        10 => "out",
        11 => "nov",
        12 => "dez",
        _ => "",
    }
}

/// Corta o texto em `max` caracteres, acrescentando reticências quando há corte.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formata_moeda_com_agrupamento() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(191.97), "R$ 191,97");
        assert_eq!(format_currency(1234.56), "R$ 1.234,56");
        assert_eq!(format_currency(1_000_000.5), "R$ 1.000.000,50");
    }

    #[test]
    fn formata_moeda_negativa() {
        assert_eq!(format_currency(-42.0), "-R$ 42,00");
    }

    #[test]
    fn formata_data_brasileira() {
        let date = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(format_date(&date), "09/03/2025");
    }

    #[test]
    fn trunca_somente_quando_excede() {
        assert_eq!(truncate("curto", 30), "curto");
        assert_eq!(truncate("Empresa Brasileira de Ferramentas Ltda", 30), "Empresa Brasileira de Ferramen...");
        assert_eq!(truncate("ação", 3), "açã...");
    }
}
