// src/services/pricing.rs

use crate::models::quote::TaxDetails;

// Resultado do cálculo de um orçamento. O valor gravado e exibido é sempre
// recalculado aqui no servidor, nunca aceito do cliente.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTotals {
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total: f64,
}

// Subtotal do item: quantidade x preço unitário, com desconto percentual.
pub fn item_subtotal(quantity: f64, unit_price: f64, discount: f64) -> f64 {
    quantity * unit_price * (1.0 - discount / 100.0)
}

// Total do orçamento: soma dos subtotais e, se o orçamento inclui impostos,
// aplica a alíquota combinada (ISS + PIS + COFINS) sobre a soma.
pub fn quote_totals(item_subtotals: &[f64], include_taxes: bool, taxes: &TaxDetails) -> QuoteTotals {
    let subtotal: f64 = item_subtotals.iter().sum();
    let tax_rate = if include_taxes { taxes.rate() } else { 0.0 };
    let tax_amount = subtotal * tax_rate / 100.0;

    QuoteTotals {
        subtotal,
        tax_rate,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliquotas_padrao() -> TaxDetails {
        TaxDetails {
            iss: 3.0,
            pis: 0.65,
            cofins: 3.0,
            others: None,
        }
    }

    #[test]
    fn aplica_desconto_e_impostos() {
        // 2 x 100,00 com 10% de desconto = 180,00; alíquota 6,65% => 191,97
        let sub = item_subtotal(2.0, 100.0, 10.0);
        assert!((sub - 180.0).abs() < 1e-9);

        let totals = quote_totals(&[sub], true, &aliquotas_padrao());
        assert!((totals.tax_rate - 6.65).abs() < 1e-9);
        assert!((totals.total - 191.97).abs() < 1e-9);
    }

    #[test]
    fn impostos_desligados_ignoram_as_aliquotas() {
        let totals = quote_totals(&[180.0], false, &aliquotas_padrao());
        assert_eq!(totals.tax_rate, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 180.0);
    }

    #[test]
    fn desconto_de_cem_por_cento_zera_o_item() {
        assert_eq!(item_subtotal(5.0, 40.0, 100.0), 0.0);
    }

    #[test]
    fn quantidade_zero_zera_o_item() {
        assert_eq!(item_subtotal(0.0, 99.9, 0.0), 0.0);
    }

    #[test]
    fn orcamento_sem_itens_tem_total_zero() {
        let totals = quote_totals(&[], true, &aliquotas_padrao());
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn soma_varios_itens_antes_dos_impostos() {
        let subs = [
            item_subtotal(1.0, 50.0, 0.0),
            item_subtotal(3.0, 20.0, 50.0),
        ];
        let totals = quote_totals(&subs, true, &aliquotas_padrao());
        assert!((totals.subtotal - 80.0).abs() < 1e-9);
        assert!((totals.total - 80.0 * 1.0665).abs() < 1e-9);
    }
}
