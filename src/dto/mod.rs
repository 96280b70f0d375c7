pub mod career_dto;
pub mod contact_dto;
pub mod invoice_dto;
pub mod quote_dto;
pub mod template_dto;
