use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

use crate::config::MediaConfig;
use crate::model::quote::QuoteTotals;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MARGIN_MM: f32 = 20.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LEFT_MM: f32 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Missing document data: {0}")]
    MissingData(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quote,
    Invoice,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "quote",
            DocumentKind::Invoice => "invoice",
        }
    }
}

/// Seller or customer block printed on a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentParty {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: u32,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Everything needed to print a quote.
#[derive(Debug, Clone)]
pub struct QuoteDocument {
    pub quote_id: String,
    pub issued_on: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub seller: DocumentParty,
    pub customer: DocumentParty,
    pub lines: Vec<DocumentLine>,
    pub totals: QuoteTotals,
    /// Bank details printed under the totals
    pub payment_details: Vec<String>,
}

/// Everything needed to print an invoice.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub invoice_id: String,
    pub quote: QuoteDocument,
    pub message: Option<String>,
    pub pay: Decimal,
    pub due: Decimal,
    pub due_date: Option<NaiveDate>,
    pub payment_term: Option<String>,
    pub is_paid: bool,
}

/// Location of a written document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Path relative to the media root, as stored on the entity
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// One printed line; cells share a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub cells: Vec<LayoutCell>,
    pub size: f32,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub x_mm: f32,
    pub text: String,
}

impl LayoutLine {
    fn text(text: impl Into<String>, size: f32, bold: bool) -> Self {
        LayoutLine {
            cells: vec![LayoutCell { x_mm: LEFT_MM, text: text.into() }],
            size,
            bold,
        }
    }

    fn columns(cells: &[(f32, String)], size: f32, bold: bool) -> Self {
        LayoutLine {
            cells: cells
                .iter()
                .map(|(x_mm, text)| LayoutCell { x_mm: *x_mm, text: text.clone() })
                .collect(),
            size,
            bold,
        }
    }

    fn blank() -> Self {
        LayoutLine { cells: Vec::new(), size: 6.0, bold: false }
    }

    fn height_mm(&self) -> f32 {
        self.size * 0.5 + 1.5
    }
}

/// Writes quote and invoice PDFs under the media root.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    config: MediaConfig,
}

impl PdfRenderer {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Deterministic location for a document: `{dir}/{kind}_{id}.pdf`.
    pub fn document_path(&self, kind: DocumentKind, id: &str) -> RenderedDocument {
        let dir = match kind {
            DocumentKind::Quote => &self.config.quotes_dir,
            DocumentKind::Invoice => &self.config.invoices_dir,
        };
        let filename = format!("{}_{}.pdf", kind.as_str(), id);
        RenderedDocument {
            relative_path: format!("{}/{}", dir, filename),
            absolute_path: self.config.media_root.join(dir).join(filename),
        }
    }

    #[instrument(skip(self, document), fields(quote_id = %document.quote_id))]
    pub async fn render_quote(&self, document: &QuoteDocument) -> Result<RenderedDocument, RenderError> {
        info!("Rendering quote document");
        if document.quote_id.trim().is_empty() {
            error!("Quote has no identifier");
            return Err(RenderError::MissingData("quote_id".to_string()));
        }
        let target = self.document_path(DocumentKind::Quote, &document.quote_id);
        let bytes = write_pdf(&format!("Quote {}", document.quote_id), &layout_quote(document))?;
        persist(&target.absolute_path, &bytes).await?;
        info!(path = %target.relative_path, "Quote document written");
        Ok(target)
    }

    #[instrument(skip(self, document), fields(invoice_id = %document.invoice_id))]
    pub async fn render_invoice(&self, document: &InvoiceDocument) -> Result<RenderedDocument, RenderError> {
        info!("Rendering invoice document");
        if document.invoice_id.trim().is_empty() {
            error!("Invoice has no identifier");
            return Err(RenderError::MissingData("invoice_id".to_string()));
        }
        let target = self.document_path(DocumentKind::Invoice, &document.invoice_id);
        let bytes = write_pdf(&format!("Invoice {}", document.invoice_id), &layout_invoice(document))?;
        persist(&target.absolute_path, &bytes).await?;
        info!(path = %target.relative_path, "Invoice document written");
        Ok(target)
    }
}

/// Overwrites `path` through a sibling temp file so a failed write leaves nothing behind.
async fn persist(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("pdf.part");
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        error!(path = %tmp.display(), "Failed to write document: {}", e);
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(RenderError::Io(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        error!(path = %path.display(), "Failed to move document into place: {}", e);
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(RenderError::Io(e));
    }
    debug!(path = %path.display(), bytes = bytes.len(), "Document persisted");
    Ok(())
}

pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn party_lines(title: &str, party: &DocumentParty, out: &mut Vec<LayoutLine>) {
    out.push(LayoutLine::text(title, 9.0, true));
    out.push(LayoutLine::text(party.name.clone(), 10.0, false));
    for line in &party.lines {
        out.push(LayoutLine::text(line.clone(), 9.0, false));
    }
}

fn item_table(document: &QuoteDocument, out: &mut Vec<LayoutLine>) {
    out.push(LayoutLine::columns(
        &[
            (LEFT_MM, "Service".to_string()),
            (120.0, "Qty".to_string()),
            (140.0, "Rate".to_string()),
            (170.0, "Amount".to_string()),
        ],
        10.0,
        true,
    ));
    for line in &document.lines {
        out.push(LayoutLine::columns(
            &[
                (LEFT_MM, line.description.clone()),
                (120.0, line.quantity.to_string()),
                (140.0, money(line.rate)),
                (170.0, money(line.amount)),
            ],
            10.0,
            false,
        ));
    }
    out.push(LayoutLine::blank());
    out.push(LayoutLine::columns(&[(140.0, "Subtotal".to_string()), (170.0, money(document.totals.total))], 10.0, false));
    out.push(LayoutLine::columns(&[(140.0, "GST (10%)".to_string()), (170.0, money(document.totals.gst_amount))], 10.0, false));
    out.push(LayoutLine::columns(&[(140.0, "Total".to_string()), (170.0, money(document.totals.total_with_gst))], 11.0, true));
}

pub fn layout_quote(document: &QuoteDocument) -> Vec<LayoutLine> {
    let mut out = vec![
        LayoutLine::text(document.seller.name.clone(), 16.0, true),
        LayoutLine::text(format!("QUOTE {}", document.quote_id), 14.0, true),
        LayoutLine::text(format!("Date: {}", document.issued_on.format("%d/%m/%Y")), 9.0, false),
    ];
    if let Some(expiry) = document.expiry_date {
        out.push(LayoutLine::text(format!("Valid until: {}", expiry.format("%d/%m/%Y")), 9.0, false));
    }
    if let Some(reference) = &document.reference {
        out.push(LayoutLine::text(format!("Reference: {}", reference), 9.0, false));
    }
    out.push(LayoutLine::blank());
    party_lines("FROM", &document.seller, &mut out);
    out.push(LayoutLine::blank());
    party_lines("QUOTE FOR", &document.customer, &mut out);
    out.push(LayoutLine::blank());
    item_table(document, &mut out);
    out
}

pub fn layout_invoice(document: &InvoiceDocument) -> Vec<LayoutLine> {
    let quote = &document.quote;
    let mut out = vec![
        LayoutLine::text(quote.seller.name.clone(), 16.0, true),
        LayoutLine::text(format!("TAX INVOICE {}", document.invoice_id), 14.0, true),
        LayoutLine::text(format!("Date: {}", quote.issued_on.format("%d/%m/%Y")), 9.0, false),
        LayoutLine::text(format!("Quote: {}", quote.quote_id), 9.0, false),
    ];
    if let Some(due_date) = document.due_date {
        out.push(LayoutLine::text(format!("Due date: {}", due_date.format("%d/%m/%Y")), 9.0, false));
    }
    if let Some(term) = &document.payment_term {
        out.push(LayoutLine::text(format!("Terms: {}", term), 9.0, false));
    }
    out.push(LayoutLine::blank());
    party_lines("FROM", &quote.seller, &mut out);
    out.push(LayoutLine::blank());
    party_lines("BILL TO", &quote.customer, &mut out);
    out.push(LayoutLine::blank());
    item_table(quote, &mut out);
    out.push(LayoutLine::columns(&[(140.0, "Paid".to_string()), (170.0, money(document.pay))], 10.0, false));
    out.push(LayoutLine::columns(&[(140.0, "Balance due".to_string()), (170.0, money(document.due))], 11.0, true));
    if document.is_paid {
        out.push(LayoutLine::text("PAID", 14.0, true));
    }
    if let Some(message) = &document.message {
        out.push(LayoutLine::blank());
        for line in message.lines() {
            out.push(LayoutLine::text(line.to_string(), 9.0, false));
        }
    }
    if !quote.payment_details.is_empty() {
        out.push(LayoutLine::blank());
        out.push(LayoutLine::text("PAYMENT DETAILS", 9.0, true));
        for line in &quote.payment_details {
            out.push(LayoutLine::text(line.clone(), 9.0, false));
        }
    }
    out
}

/// Lays the lines out top to bottom, starting a new page when one fills up.
fn write_pdf(title: &str, lines: &[LayoutLine]) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = builtin_font(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;

    let mut current: PdfLayerReference = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - TOP_MARGIN_MM;

    for line in lines {
        let height = line.height_mm();
        if y - height < BOTTOM_MARGIN_MM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT_MM - TOP_MARGIN_MM;
        }
        y -= height;
        let font = if line.bold { &bold } else { &regular };
        for cell in &line.cells {
            current.use_text(cell.text.clone(), line.size, Mm(cell.x_mm), Mm(y), font);
        }
    }

    doc.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, RenderError> {
    doc.add_builtin_font(font).map_err(|e| RenderError::Pdf(e.to_string()))
}
