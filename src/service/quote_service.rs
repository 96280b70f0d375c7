use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{NaiveDate, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::config::LifecycleConfig;
use crate::dto::invoice_dto::{InvoiceInput, InvoiceView};
use crate::dto::quote_dto::{CreateQuoteRequestDto, QuoteInput, QuoteItemInput, QuoteView};
use crate::model::catalog::Company;
use crate::model::email_template::MessageType;
use crate::model::invoice::Invoice;
use crate::model::quote::{Quote, QuoteItem, QuoteTotals};
use crate::model::quote_request::{QuoteRequest, RequestLocation};
use crate::model::status::QuoteStatus;
use crate::model::timestamp;
use crate::repository::repository_error::RepositoryError;
use crate::repository::Repositories;
use crate::service::lifecycle::{
    initial_status, plan_invoice_save, plan_item_change, plan_quote_save, ItemChange, LifecycleAction,
    QuoteFacts,
};
use crate::service::parse_object_id;
use crate::service::template_service::TemplateService;
use crate::util::email::{EmailMessage, Notifier};
use crate::util::error::ServiceError;
use crate::util::identifier;
use crate::util::pdf::{DocumentLine, DocumentParty, InvoiceDocument, PdfRenderer, QuoteDocument, RenderedDocument};

#[async_trait]
pub trait QuoteService: Send + Sync {
    // Quote requests
    async fn submit_request(&self, dto: CreateQuoteRequestDto) -> Result<QuoteRequest, ServiceError>;
    async fn get_request(&self, id: ObjectId) -> Result<QuoteRequest, ServiceError>;
    async fn list_requests(&self, page: u32, limit: u32) -> Result<Vec<QuoteRequest>, ServiceError>;
    async fn request_location(&self, id: ObjectId) -> Result<RequestLocation, ServiceError>;

    // Quotes
    async fn create_quote(&self, input: QuoteInput) -> Result<QuoteView, ServiceError>;
    async fn save_quote(&self, id: ObjectId, input: QuoteInput) -> Result<QuoteView, ServiceError>;
    async fn get_quote(&self, id: ObjectId) -> Result<QuoteView, ServiceError>;
    async fn list_quotes(&self, page: u32, limit: u32) -> Result<Vec<Quote>, ServiceError>;
    async fn delete_quote(&self, id: ObjectId) -> Result<(), ServiceError>;

    // Line items
    async fn add_item(&self, quote_id: ObjectId, input: QuoteItemInput) -> Result<QuoteView, ServiceError>;
    async fn save_item(&self, item_id: ObjectId, input: QuoteItemInput) -> Result<QuoteView, ServiceError>;
    async fn remove_item(&self, item_id: ObjectId) -> Result<QuoteView, ServiceError>;

    // Invoices
    async fn create_invoice(&self, quote_id: ObjectId, input: InvoiceInput) -> Result<InvoiceView, ServiceError>;
    async fn save_invoice(&self, id: ObjectId, input: InvoiceInput) -> Result<InvoiceView, ServiceError>;
    async fn get_invoice(&self, id: ObjectId) -> Result<InvoiceView, ServiceError>;
    async fn list_invoices(&self, page: u32, limit: u32) -> Result<Vec<Invoice>, ServiceError>;

    // Manual actions
    async fn resend_quote_email(&self, id: ObjectId) -> Result<Quote, ServiceError>;
    async fn send_invoice_email(&self, id: ObjectId) -> Result<Invoice, ServiceError>;
}

/// Everything the lifecycle actions of one request read and update.
struct Chain {
    quote: Quote,
    request: Option<QuoteRequest>,
    items: Vec<QuoteItem>,
    invoice: Option<Invoice>,
    quote_document: Option<RenderedDocument>,
    invoice_document: Option<RenderedDocument>,
}

impl Chain {
    fn quote_oid(&self) -> Result<ObjectId, ServiceError> {
        self.quote
            .id
            .ok_or_else(|| ServiceError::InternalError("Quote has no id".to_string()))
    }

    fn facts(&self) -> QuoteFacts {
        QuoteFacts {
            status: self.quote.status,
            has_request: self.request.is_some(),
            item_count: self.items.len(),
            mail_sent: self.quote.mail_sent,
        }
    }

    fn totals(&self) -> QuoteTotals {
        QuoteTotals::from_items(&self.items)
    }

    fn recipient(&self) -> Result<String, ServiceError> {
        match &self.request {
            Some(request) => Ok(request.email.clone()),
            None => Err(ServiceError::NotFound("Quote request not found".to_string())),
        }
    }
}

pub struct QuoteServiceImpl {
    pub repos: Repositories,
    pub renderer: PdfRenderer,
    pub notifier: Arc<dyn Notifier>,
    pub templates: Arc<dyn TemplateService>,
    pub config: LifecycleConfig,
}

impl QuoteServiceImpl {
    pub fn new(
        repos: Repositories,
        renderer: PdfRenderer,
        notifier: Arc<dyn Notifier>,
        templates: Arc<dyn TemplateService>,
        config: LifecycleConfig,
    ) -> Self {
        QuoteServiceImpl {
            repos,
            renderer,
            notifier,
            templates,
            config,
        }
    }

    async fn load_chain(&self, quote: Quote) -> Result<Chain, ServiceError> {
        let quote_oid = quote
            .id
            .ok_or_else(|| ServiceError::InternalError("Quote has no id".to_string()))?;
        let request = match quote.quote_request_id {
            Some(request_id) => match self.repos.quote_requests.get_by_id(request_id).await {
                Ok(request) => Some(request),
                Err(RepositoryError::NotFound(_)) => {
                    warn!(request_id = %request_id, "Quote references a missing quote request");
                    None
                }
                Err(e) => return Err(e.into()),
            },
            None => None,
        };
        let items = self.repos.quote_items.list_by_quote(quote_oid).await?;
        let invoice = self.repos.invoices.find_by_quote(quote_oid).await?;
        Ok(Chain {
            quote,
            request,
            items,
            invoice,
            quote_document: None,
            invoice_document: None,
        })
    }

    async fn view(&self, quote_id: ObjectId) -> Result<QuoteView, ServiceError> {
        let quote = self.repos.quotes.get_by_id(quote_id).await?;
        let items = self.repos.quote_items.list_by_quote(quote_id).await?;
        let invoice = self.repos.invoices.find_by_quote(quote_id).await?;
        Ok(QuoteView {
            totals: QuoteTotals::from_items(&items),
            quote,
            items,
            invoice,
        })
    }

    async fn invoice_view(&self, invoice: Invoice) -> Result<InvoiceView, ServiceError> {
        let items = self.repos.quote_items.list_by_quote(invoice.quote_id).await?;
        Ok(InvoiceView {
            totals: QuoteTotals::from_items(&items),
            invoice,
        })
    }

    /// Runs the actions in order. `CompleteParentQuote` splices the quote rules in place, at most once.
    async fn run(&self, chain: &mut Chain, actions: Vec<LifecycleAction>) -> Result<(), ServiceError> {
        let mut queue: VecDeque<LifecycleAction> = actions.into();
        let mut parent_completed = false;

        while let Some(action) = queue.pop_front() {
            debug!(?action, "Executing lifecycle action");
            match action {
                LifecycleAction::MirrorRequestStatus(status) => self.mirror_request_status(chain, status).await?,
                LifecycleAction::RenderQuote => {
                    self.render_quote(chain).await?;
                }
                LifecycleAction::SendQuoteEmail => self.send_quote_email(chain).await?,
                LifecycleAction::EnsureInvoice => self.ensure_invoice(chain).await?,
                LifecycleAction::RenderInvoice => {
                    if chain.invoice_document.is_none() {
                        self.render_invoice(chain).await?;
                    }
                }
                LifecycleAction::SendInvoiceEmail { only_if_unsent } => {
                    self.send_invoice_email_for(chain, only_if_unsent).await?
                }
                LifecycleAction::CompleteParentQuote => {
                    if parent_completed {
                        warn!("Parent quote already completed in this pass");
                        continue;
                    }
                    parent_completed = true;
                    let quote_oid = chain.quote_oid()?;
                    let previous = chain.quote.status;
                    chain.quote = self.repos.quotes.set_status(quote_oid, QuoteStatus::Completed).await?;
                    let plan = plan_quote_save(Some(previous), &chain.facts(), self.config.invoice_email_policy);
                    info!(from = %previous, to = %plan.to, actions = plan.actions.len(), "Parent quote completed");
                    for next in plan.actions.into_iter().rev() {
                        queue.push_front(next);
                    }
                }
            }
        }
        Ok(())
    }

    async fn mirror_request_status(&self, chain: &mut Chain, status: QuoteStatus) -> Result<(), ServiceError> {
        if let Some(request) = chain.request.as_mut() {
            if let Some(request_id) = request.id {
                self.repos.quote_requests.set_status(request_id, status).await.map_err(|e| {
                    error!("Failed to mirror request status: {}", e);
                    ServiceError::from(e)
                })?;
                request.status = status;
            }
        }
        Ok(())
    }

    async fn seller(&self, company_id: Option<ObjectId>) -> Result<Option<Company>, ServiceError> {
        if let Some(company_id) = company_id {
            match self.repos.companies.get_by_id(company_id).await {
                Ok(company) => return Ok(Some(company)),
                Err(RepositoryError::NotFound(_)) => warn!(company_id = %company_id, "Quote company not found"),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.repos.companies.first().await?)
    }

    async fn quote_document(&self, chain: &Chain) -> Result<QuoteDocument, ServiceError> {
        let company = self.seller(chain.quote.company_id).await?;
        let service_ids: Vec<ObjectId> = chain.items.iter().map(|item| item.service_id).collect();
        let services = self.repos.services.get_many(&service_ids).await?;

        let lines = chain
            .items
            .iter()
            .map(|item| DocumentLine {
                description: services
                    .iter()
                    .find(|service| service.id == Some(item.service_id))
                    .map(|service| service.name.clone())
                    .unwrap_or_else(|| "Service".to_string()),
                quantity: item.quantity,
                rate: item.rate,
                amount: item.amount,
            })
            .collect();

        let (seller, payment_details) = match &company {
            Some(company) => (
                DocumentParty {
                    name: company.name.clone(),
                    lines: [
                        company.address.clone(),
                        company.phone.clone(),
                        company.email.clone(),
                        company.website.clone(),
                        company.abn.as_ref().map(|abn| format!("ABN {}", abn)),
                    ]
                    .into_iter()
                    .flatten()
                    .collect(),
                },
                [
                    company.account_name.as_ref().map(|v| format!("Account name: {}", v)),
                    company.bsb.as_ref().map(|v| format!("BSB: {}", v)),
                    company.account_number.as_ref().map(|v| format!("Account number: {}", v)),
                ]
                .into_iter()
                .flatten()
                .collect(),
            ),
            None => (
                DocumentParty {
                    name: self.config.company_name.clone(),
                    lines: Vec::new(),
                },
                Vec::new(),
            ),
        };

        let quote = &chain.quote;
        let location: Vec<String> = [quote.address.clone(), quote.city.clone(), quote.postal_code.clone()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();
        let customer = match &chain.request {
            Some(request) => {
                let mut lines = vec![request.email.clone()];
                if !request.phone.is_empty() {
                    lines.push(request.phone.clone());
                }
                if !location.is_empty() {
                    lines.push(location.join(", "));
                }
                DocumentParty {
                    name: request.name.clone(),
                    lines,
                }
            }
            None => DocumentParty {
                name: "Customer".to_string(),
                lines: if location.is_empty() { Vec::new() } else { vec![location.join(", ")] },
            },
        };

        Ok(QuoteDocument {
            quote_id: quote.quote_id.clone().unwrap_or_default(),
            issued_on: issued_on(quote.created_at.as_deref()),
            expiry_date: quote.expiry_date,
            reference: quote.reference.clone(),
            seller,
            customer,
            lines,
            totals: chain.totals(),
            payment_details,
        })
    }

    async fn render_quote(&self, chain: &mut Chain) -> Result<RenderedDocument, ServiceError> {
        let quote_oid = chain.quote_oid()?;
        let document = self.quote_document(chain).await?;
        let rendered = self.renderer.render_quote(&document).await.map_err(|e| {
            error!(quote = %quote_oid, "Failed to render quote: {}", e);
            ServiceError::from(e)
        })?;
        self.repos
            .quotes
            .set_quotation_file(quote_oid, &rendered.relative_path)
            .await?;
        chain.quote.quotation_file = Some(rendered.relative_path.clone());
        chain.quote_document = Some(rendered.clone());
        Ok(rendered)
    }

    async fn send_quote_email(&self, chain: &mut Chain) -> Result<(), ServiceError> {
        let quote_oid = chain.quote_oid()?;
        let recipient = chain.recipient()?;
        let document = match chain.quote_document.clone() {
            Some(document) => document,
            None => self.render_quote(chain).await?,
        };
        let template = self.templates.resolve(MessageType::Quote).await?;
        let message = EmailMessage::new(recipient, template.subject)
            .with_body(&template.body)
            .with_attachment(document.absolute_path);

        self.notifier.send_email(message).await.map_err(|e| {
            error!(quote = %quote_oid, "Failed to send quote email: {}", e);
            ServiceError::from(e)
        })?;
        self.repos.quotes.set_mail_sent(quote_oid, true).await?;
        chain.quote.mail_sent = true;
        info!(quote = %quote_oid, "Quote email sent");
        Ok(())
    }

    fn new_invoice(&self, quote_id: ObjectId, totals: &QuoteTotals) -> Invoice {
        let now = timestamp();
        let mut invoice = Invoice::for_quote(quote_id);
        invoice.invoice_id = Some(identifier::generate(&self.config.invoice_id_prefix));
        invoice.recompute_due(totals);
        invoice.created_at = Some(now.clone());
        invoice.updated_at = Some(now);
        invoice
    }

    /// Get-or-create straight through the repository, so no invoice rules fire.
    async fn ensure_invoice(&self, chain: &mut Chain) -> Result<(), ServiceError> {
        if chain.invoice.is_some() {
            return self.refresh_invoice_due(chain).await;
        }
        let quote_oid = chain.quote_oid()?;
        if let Some(existing) = self.repos.invoices.find_by_quote(quote_oid).await? {
            chain.invoice = Some(existing);
            return self.refresh_invoice_due(chain).await;
        }
        let invoice = self.repos.invoices.create(self.new_invoice(quote_oid, &chain.totals())).await?;
        info!(quote = %quote_oid, invoice_id = ?invoice.invoice_id, "Invoice created for completed quote");
        chain.invoice = Some(invoice);
        Ok(())
    }

    /// Line items may have changed since the invoice was last saved.
    async fn refresh_invoice_due(&self, chain: &mut Chain) -> Result<(), ServiceError> {
        let totals = chain.totals();
        if let Some(invoice) = chain.invoice.as_mut() {
            let previous = invoice.due;
            invoice.recompute_due(&totals);
            if invoice.due != previous {
                debug!(from = %previous, to = %invoice.due, "Invoice due out of date");
                invoice.updated_at = Some(timestamp());
                *invoice = self.repos.invoices.update(invoice.clone()).await?;
            }
        }
        Ok(())
    }

    async fn render_invoice(&self, chain: &mut Chain) -> Result<RenderedDocument, ServiceError> {
        let invoice = chain
            .invoice
            .clone()
            .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;
        let invoice_oid = invoice
            .id
            .ok_or_else(|| ServiceError::InternalError("Invoice has no id".to_string()))?;

        let document = InvoiceDocument {
            invoice_id: invoice.invoice_id.clone().unwrap_or_default(),
            quote: self.quote_document(chain).await?,
            message: invoice.message.clone(),
            pay: invoice.pay,
            due: invoice.due,
            due_date: invoice.due_date,
            payment_term: invoice.payment_term.clone(),
            is_paid: invoice.is_paid,
        };
        let rendered = self.renderer.render_invoice(&document).await.map_err(|e| {
            error!(invoice = %invoice_oid, "Failed to render invoice: {}", e);
            ServiceError::from(e)
        })?;
        self.repos
            .invoices
            .set_invoice_file(invoice_oid, &rendered.relative_path)
            .await?;
        if let Some(invoice) = chain.invoice.as_mut() {
            invoice.invoice_file = Some(rendered.relative_path.clone());
        }
        chain.invoice_document = Some(rendered.clone());
        Ok(rendered)
    }

    async fn send_invoice_email_for(&self, chain: &mut Chain, only_if_unsent: bool) -> Result<(), ServiceError> {
        let (invoice_oid, is_sent) = match &chain.invoice {
            Some(invoice) => (
                invoice
                    .id
                    .ok_or_else(|| ServiceError::InternalError("Invoice has no id".to_string()))?,
                invoice.is_sent,
            ),
            None => return Err(ServiceError::NotFound("Invoice not found".to_string())),
        };
        if only_if_unsent && is_sent {
            info!(invoice = %invoice_oid, "Invoice already sent, skipping automatic email");
            return Ok(());
        }

        let recipient = chain.recipient()?;
        let document = match chain.invoice_document.clone() {
            Some(document) => document,
            None => self.render_invoice(chain).await?,
        };
        let template = self.templates.resolve(MessageType::Invoice).await?;
        let message = EmailMessage::new(recipient, template.subject)
            .with_body(&template.body)
            .with_attachment(document.absolute_path);

        self.notifier.send_email(message).await.map_err(|e| {
            error!(invoice = %invoice_oid, "Failed to send invoice email: {}", e);
            ServiceError::from(e)
        })?;
        self.repos.invoices.set_is_sent(invoice_oid, true).await?;
        if let Some(invoice) = chain.invoice.as_mut() {
            invoice.is_sent = true;
        }
        info!(invoice = %invoice_oid, "Invoice email sent");
        Ok(())
    }

    async fn item_changed(&self, quote_id: ObjectId, change: ItemChange) -> Result<QuoteView, ServiceError> {
        let quote = self.repos.quotes.get_by_id(quote_id).await?;
        let mut chain = self.load_chain(quote).await?;
        let actions = plan_item_change(change, &chain.facts());
        self.run(&mut chain, actions).await?;
        self.view(quote_id).await
    }

    async fn checked_service(&self, service_id: &str) -> Result<ObjectId, ServiceError> {
        let service_id = parse_object_id(service_id, "service_id")?;
        match self.repos.services.get_by_id(service_id).await {
            Ok(_) => Ok(service_id),
            Err(RepositoryError::NotFound(_)) => {
                error!(service_id = %service_id, "Unknown service");
                Err(ServiceError::InvalidInput(format!("Unknown service: {}", service_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies the quote fields present in `input` onto `quote`.
    async fn merge_quote_input(&self, quote: &mut Quote, input: QuoteInput) -> Result<(), ServiceError> {
        if let Some(request_id) = input.quote_request_id.as_deref() {
            let request_id = parse_object_id(request_id, "quote_request_id")?;
            let request = self.repos.quote_requests.get_by_id(request_id).await?;
            quote.quote_request_id = Some(request_id);
            // Location is copied from the request unless given explicitly
            if input.city.is_none() && quote.city.is_none() {
                quote.city = request.city.clone();
            }
            if input.postal_code.is_none() && quote.postal_code.is_none() {
                quote.postal_code = request.postal_code.clone();
            }
            if input.address.is_none() && quote.address.is_none() {
                quote.address = request.address.clone();
            }
        }
        if let Some(company_id) = input.company_id.as_deref() {
            let company_id = parse_object_id(company_id, "company_id")?;
            self.repos.companies.get_by_id(company_id).await?;
            quote.company_id = Some(company_id);
        }
        if let Some(status) = input.status {
            quote.status = status;
        }
        if input.city.is_some() {
            quote.city = input.city;
        }
        if input.postal_code.is_some() {
            quote.postal_code = input.postal_code;
        }
        if input.address.is_some() {
            quote.address = input.address;
        }
        if input.expiry_date.is_some() {
            quote.expiry_date = input.expiry_date;
        }
        if input.reference.is_some() {
            quote.reference = input.reference;
        }
        Ok(())
    }

    /// Identifier, first-save status and default company, computed before the single write.
    async fn derive_quote_fields(&self, quote: &mut Quote) -> Result<(), ServiceError> {
        let is_first_save = quote.quote_id.is_none();
        if is_first_save {
            quote.quote_id = Some(identifier::generate(&self.config.quote_id_prefix));
            if quote.company_id.is_none() {
                quote.company_id = self.repos.companies.first().await?.and_then(|company| company.id);
            }
        }
        quote.status = initial_status(is_first_save, quote.status);
        quote.updated_at = Some(timestamp());
        Ok(())
    }
}

fn issued_on(created_at: Option<&str>) -> NaiveDate {
    created_at
        .and_then(|value| chrono::DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.date_naive())
        .unwrap_or_else(|| Utc::now().date_naive())
}

fn check_item(input: &QuoteItemInput) -> Result<(), ServiceError> {
    input.validate().map_err(|e| {
        error!("Invalid quote item: {}", e);
        ServiceError::InvalidInput(e.to_string())
    })
}

fn apply_invoice_input(invoice: &mut Invoice, fields: InvoiceInput) -> Result<(), ServiceError> {
    if let Some(pay) = fields.pay {
        if pay.is_sign_negative() && !pay.is_zero() {
            return Err(ServiceError::InvalidInput("pay cannot be negative".to_string()));
        }
        invoice.pay = pay;
    }
    if fields.message.is_some() {
        invoice.message = fields.message;
    }
    if fields.due_date.is_some() {
        invoice.due_date = fields.due_date;
    }
    if fields.payment_term.is_some() {
        invoice.payment_term = fields.payment_term;
    }
    if let Some(is_paid) = fields.is_paid {
        invoice.is_paid = is_paid;
    }
    Ok(())
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, dto), fields(email = %dto.email))]
    async fn submit_request(&self, dto: CreateQuoteRequestDto) -> Result<QuoteRequest, ServiceError> {
        info!("Submitting quote request");

        let mut services: Vec<ObjectId> = Vec::with_capacity(dto.services.len());
        for raw in &dto.services {
            let service_id = parse_object_id(raw, "services")?;
            if !services.contains(&service_id) {
                services.push(service_id);
            }
        }
        let known = self.repos.services.get_many(&services).await?;
        if known.len() != services.len() {
            error!("Quote request references unknown services");
            return Err(ServiceError::InvalidInput("Unknown service in request".to_string()));
        }

        let now = timestamp();
        let mut request = QuoteRequest::new(dto.name, dto.email);
        request.phone = dto.phone;
        request.services = services;
        request.city = dto.city;
        request.postal_code = dto.postal_code;
        request.address = dto.address;
        request.message = dto.message;
        request.status = QuoteStatus::Pending;
        request.created_at = Some(now.clone());
        request.updated_at = Some(now);

        let request = self.repos.quote_requests.create(request).await.map_err(|e| {
            error!("Failed to create quote request: {}", e);
            ServiceError::from(e)
        })?;

        let template = self.templates.resolve(MessageType::Init).await?;
        let message = EmailMessage::new(request.email.clone(), template.subject).with_body(&template.body);
        self.notifier.send_email(message).await.map_err(|e| {
            error!("Failed to send quote request acknowledgement: {}", e);
            ServiceError::from(e)
        })?;

        info!(request = ?request.id, "Quote request submitted");
        Ok(request)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_request(&self, id: ObjectId) -> Result<QuoteRequest, ServiceError> {
        info!("Getting quote request");
        Ok(self.repos.quote_requests.get_by_id(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_requests(&self, page: u32, limit: u32) -> Result<Vec<QuoteRequest>, ServiceError> {
        info!("Listing quote requests");
        Ok(self.repos.quote_requests.list(page, limit).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn request_location(&self, id: ObjectId) -> Result<RequestLocation, ServiceError> {
        info!("Looking up quote request location");
        let request = self.repos.quote_requests.get_by_id(id).await?;
        Ok(request.location())
    }

    #[instrument(skip(self, input))]
    async fn create_quote(&self, input: QuoteInput) -> Result<QuoteView, ServiceError> {
        info!("Creating quote");
        let mut quote = Quote::default();
        self.merge_quote_input(&mut quote, input).await?;
        self.derive_quote_fields(&mut quote).await?;
        quote.created_at = quote.updated_at.clone();

        let quote = self.repos.quotes.create(quote).await.map_err(|e| {
            error!("Failed to create quote: {}", e);
            ServiceError::from(e)
        })?;
        let quote_oid = quote
            .id
            .ok_or_else(|| ServiceError::InternalError("Failed to get inserted quote id".to_string()))?;

        let mut chain = self.load_chain(quote).await?;
        let plan = plan_quote_save(None, &chain.facts(), self.config.invoice_email_policy);
        info!(to = %plan.to, actions = plan.actions.len(), "Quote created");
        self.run(&mut chain, plan.actions).await?;
        self.view(quote_oid).await
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn save_quote(&self, id: ObjectId, input: QuoteInput) -> Result<QuoteView, ServiceError> {
        info!("Saving quote");
        let mut quote = self.repos.quotes.get_by_id(id).await?;
        let previous = quote.status;
        self.merge_quote_input(&mut quote, input).await?;
        self.derive_quote_fields(&mut quote).await?;

        let quote = self.repos.quotes.update(quote).await.map_err(|e| {
            error!("Failed to update quote: {}", e);
            ServiceError::from(e)
        })?;

        let mut chain = self.load_chain(quote).await?;
        let plan = plan_quote_save(Some(previous), &chain.facts(), self.config.invoice_email_policy);
        info!(from = %previous, to = %plan.to, actions = plan.actions.len(), "Quote saved");
        self.run(&mut chain, plan.actions).await?;
        self.view(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_quote(&self, id: ObjectId) -> Result<QuoteView, ServiceError> {
        info!("Getting quote");
        self.view(id).await
    }

    #[instrument(skip(self))]
    async fn list_quotes(&self, page: u32, limit: u32) -> Result<Vec<Quote>, ServiceError> {
        info!("Listing quotes");
        Ok(self.repos.quotes.list(page, limit).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_quote(&self, id: ObjectId) -> Result<(), ServiceError> {
        info!("Deleting quote with its items and invoice");
        self.repos.quotes.get_by_id(id).await?;
        let items = self.repos.quote_items.delete_by_quote(id).await?;
        let invoices = self.repos.invoices.delete_by_quote(id).await?;
        self.repos.quotes.delete(id).await?;
        info!(items, invoices, "Quote deleted");
        Ok(())
    }

    #[instrument(skip(self, input), fields(quote_id = %quote_id))]
    async fn add_item(&self, quote_id: ObjectId, input: QuoteItemInput) -> Result<QuoteView, ServiceError> {
        info!("Adding quote item");
        check_item(&input)?;
        self.repos.quotes.get_by_id(quote_id).await?;
        let service_id = self.checked_service(&input.service_id).await?;
        let item = QuoteItem::new(quote_id, service_id, input.quantity, input.rate);
        self.repos.quote_items.create(item).await?;
        self.item_changed(quote_id, ItemChange::Saved).await
    }

    #[instrument(skip(self, input), fields(item_id = %item_id))]
    async fn save_item(&self, item_id: ObjectId, input: QuoteItemInput) -> Result<QuoteView, ServiceError> {
        info!("Saving quote item");
        check_item(&input)?;
        let mut item = self.repos.quote_items.get_by_id(item_id).await?;
        item.service_id = self.checked_service(&input.service_id).await?;
        item.quantity = input.quantity;
        item.rate = input.rate;
        item.recompute_amount();
        let item = self.repos.quote_items.update(item).await?;
        self.item_changed(item.quote_id, ItemChange::Saved).await
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    async fn remove_item(&self, item_id: ObjectId) -> Result<QuoteView, ServiceError> {
        info!("Removing quote item");
        let item = self.repos.quote_items.get_by_id(item_id).await?;
        self.repos.quote_items.delete(item_id).await?;
        self.item_changed(item.quote_id, ItemChange::Removed).await
    }

    #[instrument(skip(self, input), fields(quote_id = %quote_id))]
    async fn create_invoice(&self, quote_id: ObjectId, input: InvoiceInput) -> Result<InvoiceView, ServiceError> {
        info!("Creating invoice");
        let quote = self.repos.quotes.get_by_id(quote_id).await?;
        if self.repos.invoices.find_by_quote(quote_id).await?.is_some() {
            error!("Quote already has an invoice");
            return Err(ServiceError::Conflict(format!("Quote {} already has an invoice", quote_id)));
        }

        let mut chain = self.load_chain(quote).await?;
        let mut invoice = self.new_invoice(quote_id, &chain.totals());
        apply_invoice_input(&mut invoice, input)?;
        invoice.recompute_due(&chain.totals());

        let invoice = self.repos.invoices.create(invoice).await.map_err(|e| {
            error!("Failed to create invoice: {}", e);
            ServiceError::from(e)
        })?;
        let invoice_oid = invoice
            .id
            .ok_or_else(|| ServiceError::InternalError("Failed to get inserted invoice id".to_string()))?;
        chain.invoice = Some(invoice);

        self.run(&mut chain, plan_invoice_save(true)).await?;
        let invoice = self.repos.invoices.get_by_id(invoice_oid).await?;
        self.invoice_view(invoice).await
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn save_invoice(&self, id: ObjectId, input: InvoiceInput) -> Result<InvoiceView, ServiceError> {
        info!("Saving invoice");
        let mut invoice = self.repos.invoices.get_by_id(id).await?;
        let quote = self.repos.quotes.get_by_id(invoice.quote_id).await?;
        let mut chain = self.load_chain(quote).await?;

        apply_invoice_input(&mut invoice, input)?;
        if invoice.invoice_id.is_none() {
            invoice.invoice_id = Some(identifier::generate(&self.config.invoice_id_prefix));
        }
        invoice.recompute_due(&chain.totals());
        invoice.updated_at = Some(timestamp());

        let invoice = self.repos.invoices.update(invoice).await.map_err(|e| {
            error!("Failed to update invoice: {}", e);
            ServiceError::from(e)
        })?;
        chain.invoice = Some(invoice);

        self.run(&mut chain, plan_invoice_save(false)).await?;
        let invoice = self.repos.invoices.get_by_id(id).await?;
        self.invoice_view(invoice).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_invoice(&self, id: ObjectId) -> Result<InvoiceView, ServiceError> {
        info!("Getting invoice");
        let invoice = self.repos.invoices.get_by_id(id).await?;
        self.invoice_view(invoice).await
    }

    #[instrument(skip(self))]
    async fn list_invoices(&self, page: u32, limit: u32) -> Result<Vec<Invoice>, ServiceError> {
        info!("Listing invoices");
        Ok(self.repos.invoices.list(page, limit).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn resend_quote_email(&self, id: ObjectId) -> Result<Quote, ServiceError> {
        info!("Resending quote email");
        let quote = self.repos.quotes.get_by_id(id).await?;
        let mut chain = self.load_chain(quote).await?;
        if chain.request.is_none() {
            error!("Unable to resend email, quote request not found");
            return Err(ServiceError::NotFound("Quote request not found".to_string()));
        }
        self.run(&mut chain, vec![LifecycleAction::RenderQuote, LifecycleAction::SendQuoteEmail])
            .await?;
        Ok(self.repos.quotes.get_by_id(id).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn send_invoice_email(&self, id: ObjectId) -> Result<Invoice, ServiceError> {
        info!("Sending invoice email");
        let invoice = self.repos.invoices.get_by_id(id).await?;
        let quote = self.repos.quotes.get_by_id(invoice.quote_id).await?;
        let mut chain = self.load_chain(quote).await?;
        chain.invoice = Some(invoice);
        self.run(
            &mut chain,
            vec![
                LifecycleAction::RenderInvoice,
                LifecycleAction::SendInvoiceEmail { only_if_unsent: false },
            ],
        )
        .await?;
        Ok(self.repos.invoices.get_by_id(id).await?)
    }
}
