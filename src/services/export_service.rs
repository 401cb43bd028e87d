// src/services/export_service.rs

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use genpdf::{elements, style, Element};
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    common::{
        error::AppError,
        format::{format_currency, format_date, truncate},
    },
    db::{QuoteRepository, SettingsRepository},
    models::{
        quote::{QuoteDetail, QuoteStatus, QuoteWithClient},
        settings::CompanySettings,
    },
    services::pricing,
};

// Larguras de coluna do relatório tabular, na ordem Nº, Cliente, Título,
// Data, Valor, Status.
const REPORT_WEIGHTS: [usize; 6] = [1, 4, 4, 2, 2, 2];
const CLIENT_WIDTH: usize = 30;
const TITLE_WIDTH: usize = 25;

const CLIENT_FALLBACK: &str = "Cliente não encontrado";

#[derive(Clone)]
pub struct ExportService {
    quote_repo: QuoteRepository,
    settings_repo: SettingsRepository,
    fonts_dir: String,
}

impl ExportService {
    pub fn new(
        quote_repo: QuoteRepository,
        settings_repo: SettingsRepository,
        fonts_dir: String,
    ) -> Self {
        Self { quote_repo, settings_repo, fonts_dir }
    }

    // Relatório tabular em PDF da lista filtrada, como exibida na tela.
    pub async fn quotes_report_pdf(
        &self,
        status: Option<QuoteStatus>,
        client_id: Option<i64>,
        search: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        let quotes = self.quote_repo.list(status, client_id, search).await?;
        render_report_pdf(&quotes, &self.fonts_dir)
    }

    // Mesma lista em planilha, com os campos sem truncamento e a validade.
    pub async fn quotes_report_xlsx(
        &self,
        status: Option<QuoteStatus>,
        client_id: Option<i64>,
        search: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        let quotes = self.quote_repo.list(status, client_id, search).await?;
        render_report_xlsx(&quotes)
    }

    // Documento de orçamento individual, pronto para envio ao cliente.
    pub async fn quote_document_pdf(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let detail = self.quote_repo.get_detail(id).await?;
        let settings = self.settings_repo.get_or_create().await?;
        render_quote_document(&detail, &settings, &self.fonts_dir)
    }
}

fn load_fonts(fonts_dir: &str) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(format!("Fonte não encontrada na pasta {fonts_dir}")))
}

fn render_report_pdf(quotes: &[QuoteWithClient], fonts_dir: &str) -> Result<Vec<u8>, AppError> {
    let font_family = load_fonts(fonts_dir)?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title("Relatório de Orçamentos");
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new("Relatório de Orçamentos")
            .styled(style::Style::new().bold().with_font_size(16)),
    );
    doc.push(
        elements::Paragraph::new(format!(
            "Emitido em {} — {} orçamento(s)",
            format_date(&Utc::now()),
            quotes.len()
        ))
        .styled(style::Style::new().with_font_size(10)),
    );
    doc.push(elements::Break::new(1.5));

    let mut table = elements::TableLayout::new(REPORT_WEIGHTS.to_vec());
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Nº").styled(style_bold))
        .element(elements::Paragraph::new("Cliente").styled(style_bold))
        .element(elements::Paragraph::new("Título").styled(style_bold))
        .element(elements::Paragraph::new("Data").styled(style_bold))
        .element(elements::Paragraph::new("Valor").styled(style_bold))
        .element(elements::Paragraph::new("Status").styled(style_bold))
        .push()
        .expect("Table error");

    for entry in quotes {
        let client_name = entry
            .client
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(CLIENT_FALLBACK);

        table
            .row()
            .element(elements::Paragraph::new(format!("#{}", entry.quote.id)))
            .element(elements::Paragraph::new(truncate(client_name, CLIENT_WIDTH)))
            .element(elements::Paragraph::new(truncate(&entry.quote.title, TITLE_WIDTH)))
            .element(elements::Paragraph::new(format_date(&entry.quote.created_at)))
            .element(elements::Paragraph::new(format_currency(entry.quote.total)))
            .element(elements::Paragraph::new(entry.quote.status.as_str()))
            .push()
            .expect("Table row error");
    }

    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    Ok(buffer)
}

fn render_report_xlsx(quotes: &[QuoteWithClient]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Orçamentos")?;

    let bold = Format::new().set_bold();
    let headers = ["Nº", "Cliente", "Título", "Data", "Validade", "Valor", "Status"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    // Na planilha nada é truncado; as colunas só ganham largura de leitura.
    sheet.set_column_width(1, 35)?;
    sheet.set_column_width(2, 40)?;
    sheet.set_column_width(3, 12)?;
    sheet.set_column_width(4, 12)?;
    sheet.set_column_width(5, 15)?;

    for (i, entry) in quotes.iter().enumerate() {
        let row = (i + 1) as u32;
        let client_name = entry
            .client
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(CLIENT_FALLBACK);

        sheet.write_number(row, 0, entry.quote.id as f64)?;
        sheet.write_string(row, 1, client_name)?;
        sheet.write_string(row, 2, &entry.quote.title)?;
        sheet.write_string(row, 3, format_date(&entry.quote.created_at))?;
        sheet.write_string(row, 4, format_date(&entry.quote.valid_until))?;
        sheet.write_string(row, 5, format_currency(entry.quote.total))?;
        sheet.write_string(row, 6, entry.quote.status.as_str())?;
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

fn render_quote_document(
    detail: &QuoteDetail,
    settings: &CompanySettings,
    fonts_dir: &str,
) -> Result<Vec<u8>, AppError> {
    let font_family = load_fonts(fonts_dir)?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Orçamento #{}", detail.quote.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- Cabeçalho da empresa ---
    if let Some(logo) = settings.logo.as_deref() {
        if let Some(image) = logo_element(logo) {
            doc.push(image);
            doc.push(elements::Break::new(0.5));
        }
    }

    doc.push(
        elements::Paragraph::new(settings.name.clone())
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    let small = style::Style::new().with_font_size(10);
    if let Some(document) = &settings.document {
        doc.push(elements::Paragraph::new(format!("CNPJ/CPF: {}", document)).styled(small));
    }
    if let Some(address) = &settings.address {
        doc.push(elements::Paragraph::new(address.clone()).styled(small));
    }
    if let Some(email) = &settings.email {
        doc.push(elements::Paragraph::new(email.clone()).styled(small));
    }
    if let Some(phone) = &settings.phone {
        doc.push(elements::Paragraph::new(phone.clone()).styled(small));
    }

    doc.push(elements::Break::new(1.5));

    let mut heading = elements::Paragraph::new("ORÇAMENTO");
    heading.set_alignment(genpdf::Alignment::Center);
    doc.push(heading.styled(style::Style::new().bold().with_font_size(16)));
    doc.push(elements::Break::new(1));

    doc.push(elements::Paragraph::new(format!("Nº: #{}", detail.quote.id)));
    doc.push(elements::Paragraph::new(format!(
        "Data de Emissão: {}",
        format_date(&detail.quote.created_at)
    )));
    doc.push(elements::Paragraph::new(format!(
        "Validade: {}",
        format_date(&detail.quote.valid_until)
    )));
    doc.push(elements::Break::new(1));

    // --- Cliente ---
    doc.push(elements::Paragraph::new("CLIENTE").styled(style::Style::new().bold()));
    match &detail.client {
        Some(client) => {
            doc.push(elements::Paragraph::new(client.name.clone()));
            if let Some(document) = &client.document {
                doc.push(elements::Paragraph::new(document.clone()).styled(small));
            }
            if let Some(email) = &client.email {
                doc.push(elements::Paragraph::new(email.clone()).styled(small));
            }
            if let Some(phone) = &client.phone {
                doc.push(elements::Paragraph::new(phone.clone()).styled(small));
            }
            if let Some(address) = &client.address {
                doc.push(elements::Paragraph::new(address.clone()).styled(small));
            }
        }
        None => doc.push(elements::Paragraph::new(CLIENT_FALLBACK)),
    }

    doc.push(elements::Break::new(1));
    doc.push(
        elements::Paragraph::new(detail.quote.title.clone())
            .styled(style::Style::new().bold().with_font_size(12)),
    );
    doc.push(elements::Break::new(1));

    // --- Itens ---
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 1, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Item").styled(style_bold))
        .element(elements::Paragraph::new("Qtde").styled(style_bold))
        .element(elements::Paragraph::new("Preço Unit.").styled(style_bold))
        .element(elements::Paragraph::new("Desc.").styled(style_bold))
        .element(elements::Paragraph::new("Subtotal").styled(style_bold))
        .push()
        .expect("Table error");

    for entry in &detail.items {
        let label = entry
            .product
            .as_ref()
            .map(|p| p.name.clone())
            .or_else(|| entry.item.description.clone())
            .unwrap_or_else(|| "Produto desconhecido".to_string());

        table
            .row()
            .element(elements::Paragraph::new(label))
            .element(elements::Paragraph::new(decimal_pt(entry.item.quantity)))
            .element(elements::Paragraph::new(format_currency(entry.item.unit_price)))
            .element(elements::Paragraph::new(format!("{}%", decimal_pt(entry.item.discount))))
            .element(elements::Paragraph::new(format_currency(entry.item.subtotal)))
            .push()
            .expect("Table row error");
    }

    doc.push(table);
    doc.push(elements::Break::new(1));

    // --- Totais ---
    let subtotals: Vec<f64> = detail.items.iter().map(|i| i.item.subtotal).collect();
    let totals = pricing::quote_totals(
        &subtotals,
        detail.quote.include_taxes,
        &detail.quote.tax_details,
    );

    let mut line = elements::Paragraph::new(format!("Subtotal: {}", format_currency(totals.subtotal)));
    line.set_alignment(genpdf::Alignment::Right);
    doc.push(line);

    if detail.quote.include_taxes {
        let mut line = elements::Paragraph::new(format!(
            "Impostos ({}%): {}",
            decimal_pt(totals.tax_rate),
            format_currency(totals.tax_amount)
        ));
        line.set_alignment(genpdf::Alignment::Right);
        doc.push(line);
    }

    let mut total_line = elements::Paragraph::new(format!("Total: {}", format_currency(detail.quote.total)));
    total_line.set_alignment(genpdf::Alignment::Right);
    doc.push(total_line.styled(style::Style::new().bold().with_font_size(12)));

    doc.push(elements::Break::new(1.5));

    // --- Condições comerciais ---
    doc.push(elements::Paragraph::new("CONDIÇÕES COMERCIAIS").styled(style::Style::new().bold()));
    match detail.quote.custom_payment.as_deref() {
        // O texto livre, quando preenchido, substitui os campos estruturados.
        Some(custom) if !custom.trim().is_empty() => {
            doc.push(elements::Paragraph::new(custom.to_string()));
        }
        _ => {
            if let Some(method) = &detail.quote.payment_method {
                doc.push(elements::Paragraph::new(format!(
                    "Forma de pagamento: {}",
                    payment_label(method)
                )));
            }
            if let Some(terms) = &detail.quote.payment_terms {
                doc.push(elements::Paragraph::new(format!("Condições: {}", terms)));
            }
            if let Some(delivery) = &detail.quote.delivery_time {
                doc.push(elements::Paragraph::new(format!("Prazo de entrega: {}", delivery)));
            }
        }
    }

    if let Some(notes) = &detail.quote.notes {
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new("OBSERVAÇÕES").styled(style::Style::new().bold()));
        doc.push(elements::Paragraph::new(notes.clone()));
    }

    doc.push(elements::Break::new(2));
    doc.push(
        elements::Paragraph::new("Documento gerado pelo sistema OrçaFácil")
            .styled(style::Style::new().italic().with_font_size(8)),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    Ok(buffer)
}

// A logomarca chega como data-URL base64 vinda do formulário de configurações.
// Qualquer problema na decodificação apenas omite a imagem do documento.
fn logo_element(logo: &str) -> Option<elements::Image> {
    let payload = logo.split("base64,").nth(1)?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    let dynamic = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!("⚠️ Logomarca ilegível, documento sai sem ela: {}", e);
            return None;
        }
    };

    elements::Image::from_dynamic_image(dynamic)
        .ok()
        .map(|img| img.with_scale(genpdf::Scale::new(0.4, 0.4)))
}

fn payment_label(method: &str) -> &str {
    match method {
        "pix" => "PIX",
        "boleto" => "Boleto Bancário",
        "cartao" => "Cartão de Crédito",
        "dinheiro" => "Dinheiro",
        "transferencia" => "Transferência Bancária",
        other => other,
    }
}

// Números com vírgula decimal, como se escreve por aqui.
fn decimal_pt(value: f64) -> String {
    value.to_string().replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::Client;
    use crate::models::quote::{Quote, TaxDetails};
    use chrono::Duration;

    fn entry(id: i64, title: &str, total: f64) -> QuoteWithClient {
        let now = Utc::now();
        QuoteWithClient {
            quote: Quote {
                id,
                title: title.to_string(),
                client_id: 1,
                status: QuoteStatus::Pending,
                total,
                valid_until: now + Duration::days(30),
                notes: None,
                payment_method: None,
                payment_terms: None,
                custom_payment: None,
                delivery_time: None,
                include_taxes: false,
                tax_details: TaxDetails::default(),
                created_at: now,
            },
            client: Some(Client {
                id: 1,
                name: "Construtora Horizonte Ltda".to_string(),
                document: None,
                email: None,
                phone: None,
                address: None,
                created_at: now,
            }),
        }
    }

    #[test]
    fn planilha_sai_como_xlsx_valido() {
        let quotes = vec![
            entry(1, "Reforma do escritório central", 191.97),
            entry(2, "Manutenção preventiva", 850.0),
        ];

        let bytes = render_report_xlsx(&quotes).unwrap();
        // arquivos xlsx são pacotes zip
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn planilha_vazia_ainda_gera_arquivo() {
        let bytes = render_report_xlsx(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn relatorio_pdf_sem_fontes_da_erro_claro() {
        let err = render_report_pdf(&[], "./fontes-que-nao-existem").unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }

    #[test]
    fn rotulos_de_pagamento_conhecidos() {
        assert_eq!(payment_label("pix"), "PIX");
        assert_eq!(payment_label("boleto"), "Boleto Bancário");
        assert_eq!(payment_label("carne"), "carne");
    }

    #[test]
    fn decimais_com_virgula() {
        assert_eq!(decimal_pt(6.65), "6,65");
        assert_eq!(decimal_pt(10.0), "10");
    }

    #[test]
    fn logomarca_invalida_e_ignorada() {
        assert!(logo_element("data:image/png;base64,isto-não-é-base64").is_none());
        assert!(logo_element("sem prefixo nenhum").is_none());
    }
}
