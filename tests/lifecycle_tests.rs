mod common;

use common::{dollars, setup, setup_with};
use fieldworks_backend::app::AppServices;
use fieldworks_backend::config::{InvoiceEmailPolicy, LifecycleConfig, MediaConfig};
use fieldworks_backend::dto::invoice_dto::InvoiceInput;
use fieldworks_backend::dto::quote_dto::QuoteInput;
use fieldworks_backend::model::status::QuoteStatus;
use fieldworks_backend::repository::invoice_repo::InvoiceRepository;
use fieldworks_backend::repository::quote_item_repo::QuoteItemRepository;
use fieldworks_backend::service::quote_service::QuoteService;
use fieldworks_backend::util::error::ServiceError;
use rust_decimal::Decimal;

const QUOTE_SUBJECT: &str = "Your quote is ready";
const INVOICE_SUBJECT: &str = "Your invoice is ready";

fn completed() -> QuoteInput {
    QuoteInput {
        status: Some(QuoteStatus::Completed),
        ..QuoteInput::default()
    }
}

#[tokio::test]
async fn test_intake_sends_acknowledgement() {
    let app = setup().await;
    let request = app.submit_request().await;

    assert_eq!(request.status, QuoteStatus::Pending);
    let sent = app.notifier.with_subject("Quote Request Received");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@x.com");
    assert!(sent[0].attachment.is_none());
}

#[tokio::test]
async fn test_intake_rejects_unknown_service() {
    let app = setup().await;
    let mut dto = fieldworks_backend::dto::quote_dto::CreateQuoteRequestDto {
        name: "Jane".to_string(),
        email: "jane@x.com".to_string(),
        phone: String::new(),
        services: vec![bson::oid::ObjectId::new().to_hex()],
        city: None,
        postal_code: None,
        address: None,
        message: String::new(),
    };
    let result = app.services.quotes.submit_request(dto.clone()).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    dto.services = vec!["nope".to_string()];
    let result = app.services.quotes.submit_request(dto).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_new_quote_is_replied_and_mirrors_request() {
    let app = setup().await;
    let request = app.submit_request().await;

    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();

    let quote_id = view.quote.quote_id.clone().unwrap();
    assert!(quote_id.starts_with("fwz-"));
    assert_eq!(quote_id.len(), "fwz-".len() + 6);
    assert_eq!(view.quote.status, QuoteStatus::Replied);
    assert_eq!(view.quote.company_id, app.company.id);
    assert_eq!(view.quote.city.as_deref(), Some("Brisbane"));
    assert!(!view.quote.mail_sent);

    let request = app.services.quotes.get_request(request.id.unwrap()).await.unwrap();
    assert_eq!(request.status, QuoteStatus::Replied);
    // No items yet, so nothing beyond the acknowledgement
    assert!(app.notifier.with_subject(QUOTE_SUBJECT).is_empty());
}

#[tokio::test]
async fn test_quote_id_is_stable_across_saves() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();

    let saved = app
        .services
        .quotes
        .save_quote(
            id,
            QuoteInput {
                reference: Some("Job 17".to_string()),
                ..QuoteInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.quote.quote_id, view.quote.quote_id);
    assert_eq!(saved.quote.reference.as_deref(), Some("Job 17"));
}

#[tokio::test]
async fn test_first_item_renders_and_sends_quote_once() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();

    let view = app.services.quotes.add_item(id, app.lawn_item(2, dollars(100))).await.unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].amount, dollars(200));
    assert_eq!(view.totals.total, dollars(200));
    assert_eq!(view.totals.gst_amount, dollars(20));
    assert_eq!(view.totals.total_with_gst, dollars(220));
    assert!(view.quote.mail_sent);

    let file = view.quote.quotation_file.clone().unwrap();
    assert_eq!(file, format!("quotes/quote_{}.pdf", view.quote.quote_id.clone().unwrap()));
    assert!(app.media.path().join(&file).exists());

    let sent = app.notifier.with_subject(QUOTE_SUBJECT);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@x.com");
    assert_eq!(sent[0].attachment.as_deref(), Some(app.media.path().join(&file).as_path()));

    // Further saves while mail_sent is true never resend
    app.services.quotes.add_item(id, app.lawn_item(1, dollars(50))).await.unwrap();
    app.services.quotes.save_quote(id, QuoteInput::default()).await.unwrap();
    assert_eq!(app.notifier.with_subject(QUOTE_SUBJECT).len(), 1);
}

#[tokio::test]
async fn test_item_edit_and_removal_rerender_quote() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    let view = app.services.quotes.add_item(id, app.lawn_item(2, dollars(100))).await.unwrap();
    let item_id = view.items[0].id.unwrap();

    let view = app.services.quotes.save_item(item_id, app.lawn_item(3, dollars(100))).await.unwrap();
    assert_eq!(view.items[0].amount, dollars(300));
    assert_eq!(view.totals.total_with_gst, dollars(330));

    let view = app.services.quotes.remove_item(item_id).await.unwrap();
    assert!(view.items.is_empty());
    assert_eq!(view.totals.total, dollars(0));
    let file = view.quote.quotation_file.unwrap();
    assert!(app.media.path().join(file).exists());
}

#[tokio::test]
async fn test_rejected_quote_only_mirrors_status() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.notifier.set_failing(true);

    let view = app
        .services
        .quotes
        .save_quote(
            id,
            QuoteInput {
                status: Some(QuoteStatus::Rejected),
                ..QuoteInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(view.quote.status, QuoteStatus::Rejected);
    let request = app.services.quotes.get_request(request.id.unwrap()).await.unwrap();
    assert_eq!(request.status, QuoteStatus::Rejected);
    assert!(view.invoice.is_none());
}

#[tokio::test]
async fn test_completing_quote_issues_exactly_one_invoice() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(2, dollars(100))).await.unwrap();

    let view = app.services.quotes.save_quote(id, completed()).await.unwrap();

    let request = app.services.quotes.get_request(request.id.unwrap()).await.unwrap();
    assert_eq!(request.status, QuoteStatus::Completed);
    let invoice = view.invoice.clone().unwrap();
    assert!(invoice.invoice_id.clone().unwrap().starts_with("fwz-inv-"));
    assert_eq!(invoice.due, dollars(220));
    assert!(invoice.is_sent);
    let file = invoice.invoice_file.clone().unwrap();
    assert!(app.media.path().join(&file).exists());
    assert_eq!(app.notifier.with_subject(INVOICE_SUBJECT).len(), 1);

    // A second save finds the existing invoice and does not resend under the default policy
    let again = app.services.quotes.save_quote(id, completed()).await.unwrap();
    assert_eq!(again.invoice.unwrap().id, invoice.id);
    assert_eq!(app.services.quotes.list_invoices(1, 20).await.unwrap().len(), 1);
    assert_eq!(app.notifier.with_subject(INVOICE_SUBJECT).len(), 1);
}

#[tokio::test]
async fn test_completed_without_items_creates_no_invoice() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();

    let view = app.services.quotes.save_quote(view.quote.id.unwrap(), completed()).await.unwrap();
    assert!(view.invoice.is_none());
    assert!(app.notifier.with_subject(INVOICE_SUBJECT).is_empty());
}

#[tokio::test]
async fn test_every_save_policy_resends_invoice() {
    let app = setup_with(LifecycleConfig {
        invoice_email_policy: InvoiceEmailPolicy::EverySave,
        ..LifecycleConfig::default()
    })
    .await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(1, dollars(80))).await.unwrap();

    app.services.quotes.save_quote(id, completed()).await.unwrap();
    app.services.quotes.save_quote(id, completed()).await.unwrap();

    assert_eq!(app.notifier.with_subject(INVOICE_SUBJECT).len(), 2);
    assert_eq!(app.services.quotes.list_invoices(1, 20).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invoice_payment_recomputes_due() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(2, dollars(100))).await.unwrap();
    let view = app.services.quotes.save_quote(id, completed()).await.unwrap();
    let invoice = view.invoice.unwrap();
    let path = app.media.path().join(invoice.invoice_file.clone().unwrap());
    std::fs::remove_file(&path).unwrap();

    let saved = app
        .services
        .quotes
        .save_invoice(
            invoice.id.unwrap(),
            InvoiceInput {
                pay: Some(dollars(100)),
                ..InvoiceInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.invoice.pay, dollars(100));
    assert_eq!(saved.invoice.due, dollars(120));
    assert_eq!(saved.invoice.invoice_id, invoice.invoice_id);
    assert_eq!(saved.totals.total_with_gst, dollars(220));
    // Every invoice save writes the document again
    assert!(path.exists());
}

#[tokio::test]
async fn test_negative_payment_is_rejected() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await.unwrap();
    let invoice = app.services.quotes.save_quote(id, completed()).await.unwrap().invoice.unwrap();

    let result = app
        .services
        .quotes
        .save_invoice(
            invoice.id.unwrap(),
            InvoiceInput {
                pay: Some(dollars(-5)),
                ..InvoiceInput::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_manual_invoice_completes_parent_quote_once() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(2, dollars(100))).await.unwrap();

    let created = app
        .services
        .quotes
        .create_invoice(
            id,
            InvoiceInput {
                payment_term: Some("14 days".to_string()),
                ..InvoiceInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.invoice.due, dollars(220));
    assert_eq!(created.invoice.payment_term.as_deref(), Some("14 days"));
    assert!(created.invoice.invoice_file.is_some());
    assert!(created.invoice.is_sent);

    let quote = app.services.quotes.get_quote(id).await.unwrap();
    assert_eq!(quote.quote.status, QuoteStatus::Completed);
    let request = app.services.quotes.get_request(request.id.unwrap()).await.unwrap();
    assert_eq!(request.status, QuoteStatus::Completed);
    assert_eq!(app.services.quotes.list_invoices(1, 20).await.unwrap().len(), 1);
    assert_eq!(app.notifier.with_subject(INVOICE_SUBJECT).len(), 1);

    let duplicate = app.services.quotes.create_invoice(id, InvoiceInput::default()).await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_failed_send_leaves_flag_unset() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();

    app.notifier.set_failing(true);
    let result = app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await;
    assert!(matches!(result, Err(ServiceError::Send(_))));

    let view = app.services.quotes.get_quote(id).await.unwrap();
    assert!(!view.quote.mail_sent);
    // The item write itself was kept
    assert_eq!(view.items.len(), 1);

    app.notifier.set_failing(false);
    let quote = app.services.quotes.resend_quote_email(id).await.unwrap();
    assert!(quote.mail_sent);
    assert_eq!(app.notifier.with_subject(QUOTE_SUBJECT).len(), 1);
}

#[tokio::test]
async fn test_manual_resend_ignores_sent_flags() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await.unwrap();
    let invoice = app.services.quotes.save_quote(id, completed()).await.unwrap().invoice.unwrap();

    app.services.quotes.resend_quote_email(id).await.unwrap();
    app.services.quotes.send_invoice_email(invoice.id.unwrap()).await.unwrap();

    assert_eq!(app.notifier.with_subject(QUOTE_SUBJECT).len(), 2);
    assert_eq!(app.notifier.with_subject(INVOICE_SUBJECT).len(), 2);
}

#[tokio::test]
async fn test_stored_template_overrides_default() {
    use fieldworks_backend::model::email_template::{EmailMessageTemplate, MessageType};
    use fieldworks_backend::service::template_service::TemplateService;

    let app = setup().await;
    app.services
        .templates
        .create_template(EmailMessageTemplate::new(
            MessageType::Quote,
            "Quote from Fieldworks",
            "See attached.",
        ))
        .await
        .unwrap();
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    app.services
        .quotes
        .add_item(view.quote.id.unwrap(), app.lawn_item(1, dollars(100)))
        .await
        .unwrap();

    let sent = app.notifier.with_subject("Quote from Fieldworks");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text_body.as_deref(), Some("See attached."));
}

#[tokio::test]
async fn test_delete_quote_cascades() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await.unwrap();
    app.services.quotes.save_quote(id, completed()).await.unwrap();

    app.services.quotes.delete_quote(id).await.unwrap();

    assert!(matches!(
        app.services.quotes.get_quote(id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(app.repos.quote_items.list_by_quote(id).await.unwrap().is_empty());
    assert!(app.repos.invoices.find_by_quote(id).await.unwrap().is_none());
    // The request itself survives
    assert!(app.services.quotes.get_request(request.id.unwrap()).await.is_ok());
}

#[tokio::test]
async fn test_request_location_lookup() {
    let app = setup().await;
    let request = app.submit_request().await;

    let location = app.services.quotes.request_location(request.id.unwrap()).await.unwrap();
    assert!(location.found);
    assert_eq!(location.city, "Brisbane");
    assert_eq!(location.postal_code, "4000");
    assert_eq!(location.address, "1 Queen St");

    let missing = app.services.quotes.request_location(bson::oid::ObjectId::new()).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_invalid_item_is_rejected_before_any_action() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();

    let result = app
        .services
        .quotes
        .add_item(id, app.lawn_item(0, Decimal::new(-5000, 2)))
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    let view = app.services.quotes.get_quote(id).await.unwrap();
    assert!(view.items.is_empty());
    assert!(view.quote.quotation_file.is_none());
    assert!(app.notifier.with_subject(QUOTE_SUBJECT).is_empty());

    // An existing line keeps its values when an edit is invalid
    let view = app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await.unwrap();
    let item_id = view.items[0].id.unwrap();
    let result = app
        .services
        .quotes
        .save_item(item_id, app.lawn_item(2, Decimal::new(-1, 0)))
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    let item = app.repos.quote_items.get_by_id(item_id).await.unwrap();
    assert_eq!(item.quantity, 1);
    assert_eq!(item.rate, dollars(100));
    assert_eq!(app.notifier.with_subject(QUOTE_SUBJECT).len(), 1);
}

#[tokio::test]
async fn test_failed_render_leaves_flag_unset() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();

    // A directory where the document should go makes the final move fail
    let quotes_dir = app.media.path().join("quotes");
    let blocked = quotes_dir.join(format!("quote_{}.pdf", view.quote.quote_id.unwrap()));
    std::fs::create_dir_all(&blocked).unwrap();

    let result = app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await;
    assert!(matches!(result, Err(ServiceError::Render(_))));

    let view = app.services.quotes.get_quote(id).await.unwrap();
    assert!(!view.quote.mail_sent);
    assert!(view.quote.quotation_file.is_none());
    assert!(app.notifier.with_subject(QUOTE_SUBJECT).is_empty());

    let leftovers: Vec<_> = std::fs::read_dir(&quotes_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
}

#[tokio::test]
async fn test_failed_invoice_render_leaves_is_sent_unset() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await.unwrap();

    // Same data, but the media root is a regular file
    let not_a_dir = app.media.path().join("media.txt");
    std::fs::write(&not_a_dir, b"not a directory").unwrap();
    let broken = AppServices::new(
        app.repos.clone(),
        MediaConfig::with_root(not_a_dir.clone()),
        LifecycleConfig::default(),
        app.notifier.clone(),
    );

    let result = broken.quotes.save_quote(id, completed()).await;
    assert!(matches!(result, Err(ServiceError::Render(_))));

    let invoice = app.repos.invoices.find_by_quote(id).await.unwrap().unwrap();
    assert!(!invoice.is_sent);
    assert!(invoice.invoice_file.is_none());
    assert!(app.notifier.with_subject(INVOICE_SUBJECT).is_empty());
}

#[tokio::test]
async fn test_invoice_due_follows_items_added_after_completion() {
    let app = setup().await;
    let request = app.submit_request().await;
    let view = app.services.quotes.create_quote(app.quote_for(&request)).await.unwrap();
    let id = view.quote.id.unwrap();
    app.services.quotes.add_item(id, app.lawn_item(2, dollars(100))).await.unwrap();
    let invoice = app.services.quotes.save_quote(id, completed()).await.unwrap().invoice.unwrap();
    assert_eq!(invoice.due, dollars(220));

    app.services.quotes.add_item(id, app.lawn_item(1, dollars(100))).await.unwrap();
    let view = app.services.quotes.save_quote(id, completed()).await.unwrap();

    let invoice = view.invoice.unwrap();
    assert_eq!(view.totals.total_with_gst, dollars(330));
    assert_eq!(invoice.due, dollars(330));
    assert_eq!(invoice.due.to_string(), "330.00");
    // Still one invoice, and the default policy does not mail it again
    assert_eq!(app.notifier.with_subject(INVOICE_SUBJECT).len(), 1);
}
