pub mod career;
pub mod catalog;
pub mod contact;
pub mod email_template;
pub mod invoice;
pub mod quote;
pub mod quote_request;
pub mod status;

use bson::oid::ObjectId;

/// Persisted record keyed by a MongoDB `_id`.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<ObjectId>;
    fn set_id(&mut self, id: ObjectId);
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> Option<ObjectId> {
                    self.id
                }

                fn set_id(&mut self, id: ObjectId) {
                    self.id = Some(id);
                }
            }
        )*
    };
}

impl_entity!(
    catalog::Service,
    catalog::Company,
    quote_request::QuoteRequest,
    quote::Quote,
    quote::QuoteItem,
    invoice::Invoice,
    email_template::EmailMessageTemplate,
    contact::Contact,
    career::Vacancy,
    career::Application,
);

/// RFC 3339 timestamp used for `created_at` / `updated_at` fields.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
