//! Transition rules for the quote request → quote → invoice chain.
//!
//! Every rule is a pure function from the observed state to an ordered list of
//! actions. `QuoteServiceImpl` executes the actions after the triggering write
//! has been persisted.

use crate::config::InvoiceEmailPolicy;
use crate::model::status::QuoteStatus;

/// Side effect requested by a transition rule, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Copy the quote's status onto its quote request
    MirrorRequestStatus(QuoteStatus),
    RenderQuote,
    /// Email the rendered quote and set `mail_sent` on success
    SendQuoteEmail,
    /// Get-or-create the invoice of the quote
    EnsureInvoice,
    RenderInvoice,
    /// Email the rendered invoice and set `is_sent` on success
    SendInvoiceEmail { only_if_unsent: bool },
    /// Force the parent quote to `completed` and run the quote rules once
    CompleteParentQuote,
}

/// State of a quote as seen after its derived fields were computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteFacts {
    pub status: QuoteStatus,
    pub has_request: bool,
    pub item_count: usize,
    pub mail_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: Option<QuoteStatus>,
    pub to: QuoteStatus,
    pub actions: Vec<LifecycleAction>,
}

/// Status a quote is stored with. A first save moves `pending` to `replied`.
pub fn initial_status(is_first_save: bool, requested: QuoteStatus) -> QuoteStatus {
    if is_first_save && requested == QuoteStatus::Pending {
        QuoteStatus::Replied
    } else {
        requested
    }
}

/// Actions for a persisted quote write. `previous` is `None` on creation.
pub fn plan_quote_save(
    previous: Option<QuoteStatus>,
    facts: &QuoteFacts,
    policy: InvoiceEmailPolicy,
) -> TransitionPlan {
    let mut actions = Vec::new();

    if facts.has_request {
        match facts.status {
            QuoteStatus::Replied => {
                actions.push(LifecycleAction::MirrorRequestStatus(QuoteStatus::Replied));
                if facts.item_count > 0 && !facts.mail_sent {
                    actions.push(LifecycleAction::RenderQuote);
                    actions.push(LifecycleAction::SendQuoteEmail);
                }
            }
            QuoteStatus::Rejected => {
                actions.push(LifecycleAction::MirrorRequestStatus(QuoteStatus::Rejected));
            }
            QuoteStatus::Completed => {
                actions.push(LifecycleAction::MirrorRequestStatus(QuoteStatus::Completed));
                if facts.item_count > 0 {
                    actions.push(LifecycleAction::EnsureInvoice);
                    actions.push(LifecycleAction::RenderInvoice);
                    actions.push(LifecycleAction::SendInvoiceEmail {
                        only_if_unsent: policy == InvoiceEmailPolicy::Once,
                    });
                }
            }
            QuoteStatus::Pending | QuoteStatus::Approved | QuoteStatus::Cancelled => {}
        }
    }

    TransitionPlan {
        from: previous,
        to: facts.status,
        actions,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    Saved,
    Removed,
}

/// Actions after a line item of the quote described by `facts` changed.
pub fn plan_item_change(change: ItemChange, facts: &QuoteFacts) -> Vec<LifecycleAction> {
    let mut actions = vec![LifecycleAction::RenderQuote];
    if change == ItemChange::Saved
        && facts.status == QuoteStatus::Replied
        && !facts.mail_sent
        && facts.has_request
    {
        actions.push(LifecycleAction::SendQuoteEmail);
    }
    actions
}

/// Actions after an invoice write. Every save re-renders the document.
pub fn plan_invoice_save(created: bool) -> Vec<LifecycleAction> {
    let mut actions = vec![LifecycleAction::RenderInvoice];
    if created {
        actions.push(LifecycleAction::CompleteParentQuote);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleAction::*;

    fn facts(status: QuoteStatus, item_count: usize, mail_sent: bool) -> QuoteFacts {
        QuoteFacts {
            status,
            has_request: true,
            item_count,
            mail_sent,
        }
    }

    #[test]
    fn test_first_save_moves_pending_to_replied() {
        assert_eq!(initial_status(true, QuoteStatus::Pending), QuoteStatus::Replied);
        assert_eq!(initial_status(true, QuoteStatus::Rejected), QuoteStatus::Rejected);
        assert_eq!(initial_status(false, QuoteStatus::Pending), QuoteStatus::Pending);
    }

    #[test]
    fn test_new_quote_without_items_only_mirrors() {
        let plan = plan_quote_save(None, &facts(QuoteStatus::Replied, 0, false), InvoiceEmailPolicy::Once);
        assert_eq!(plan.from, None);
        assert_eq!(plan.actions, vec![MirrorRequestStatus(QuoteStatus::Replied)]);
    }

    #[test]
    fn test_replied_with_items_renders_and_sends_once() {
        let plan = plan_quote_save(
            Some(QuoteStatus::Replied),
            &facts(QuoteStatus::Replied, 1, false),
            InvoiceEmailPolicy::Once,
        );
        assert_eq!(
            plan.actions,
            vec![MirrorRequestStatus(QuoteStatus::Replied), RenderQuote, SendQuoteEmail]
        );

        let again = plan_quote_save(
            Some(QuoteStatus::Replied),
            &facts(QuoteStatus::Replied, 1, true),
            InvoiceEmailPolicy::Once,
        );
        assert_eq!(again.actions, vec![MirrorRequestStatus(QuoteStatus::Replied)]);
    }

    #[test]
    fn test_rejected_only_mirrors() {
        let plan = plan_quote_save(
            Some(QuoteStatus::Replied),
            &facts(QuoteStatus::Rejected, 3, false),
            InvoiceEmailPolicy::Once,
        );
        assert_eq!(plan.actions, vec![MirrorRequestStatus(QuoteStatus::Rejected)]);
    }

    #[test]
    fn test_completed_issues_invoice_under_policy() {
        let once = plan_quote_save(
            Some(QuoteStatus::Replied),
            &facts(QuoteStatus::Completed, 1, true),
            InvoiceEmailPolicy::Once,
        );
        assert_eq!(
            once.actions,
            vec![
                MirrorRequestStatus(QuoteStatus::Completed),
                EnsureInvoice,
                RenderInvoice,
                SendInvoiceEmail { only_if_unsent: true },
            ]
        );

        let every = plan_quote_save(
            Some(QuoteStatus::Completed),
            &facts(QuoteStatus::Completed, 1, true),
            InvoiceEmailPolicy::EverySave,
        );
        assert_eq!(every.actions.last(), Some(&SendInvoiceEmail { only_if_unsent: false }));
    }

    #[test]
    fn test_completed_without_items_skips_invoice() {
        let plan = plan_quote_save(None, &facts(QuoteStatus::Completed, 0, false), InvoiceEmailPolicy::Once);
        assert_eq!(plan.actions, vec![MirrorRequestStatus(QuoteStatus::Completed)]);
    }

    #[test]
    fn test_quote_without_request_has_no_actions() {
        let mut orphan = facts(QuoteStatus::Completed, 2, false);
        orphan.has_request = false;
        assert!(plan_quote_save(None, &orphan, InvoiceEmailPolicy::Once).actions.is_empty());
    }

    #[test]
    fn test_quote_rules_never_complete_parent() {
        for status in [
            QuoteStatus::Pending,
            QuoteStatus::Replied,
            QuoteStatus::Rejected,
            QuoteStatus::Approved,
            QuoteStatus::Cancelled,
            QuoteStatus::Completed,
        ] {
            let plan = plan_quote_save(None, &facts(status, 1, false), InvoiceEmailPolicy::EverySave);
            assert!(!plan.actions.contains(&CompleteParentQuote));
        }
    }

    #[test]
    fn test_item_save_renders_and_sends_when_replied() {
        assert_eq!(
            plan_item_change(ItemChange::Saved, &facts(QuoteStatus::Replied, 1, false)),
            vec![RenderQuote, SendQuoteEmail]
        );
        assert_eq!(
            plan_item_change(ItemChange::Saved, &facts(QuoteStatus::Replied, 1, true)),
            vec![RenderQuote]
        );
        assert_eq!(
            plan_item_change(ItemChange::Removed, &facts(QuoteStatus::Replied, 0, false)),
            vec![RenderQuote]
        );
    }

    #[test]
    fn test_invoice_creation_completes_parent() {
        assert_eq!(plan_invoice_save(true), vec![RenderInvoice, CompleteParentQuote]);
        assert_eq!(plan_invoice_save(false), vec![RenderInvoice]);
    }
}
