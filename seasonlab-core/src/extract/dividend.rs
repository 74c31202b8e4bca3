//! Dividend ex-date windows.
//!
//! Ex-dividend dates are per-symbol data the core cannot derive from the
//! calendar, so the synchronous extractor has nothing to say and always
//! returns `None`. The async [`explain_dividend_window`] asks an external
//! [`ExDividendSource`] and labels a date relative to the nearest ex-date.

use chrono::{Duration, NaiveDate};

use super::window::window_label;

/// Days on each side of an ex-date covered by the explainer.
pub const DIVIDEND_WINDOW_DAYS: i64 = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DividendError {
    #[error("no dividend data for {0}")]
    UnknownSymbol(String),
    #[error("dividend source failed: {0}")]
    Source(String),
    #[error("dividend window around {0} leaves the representable date range")]
    OutOfRange(NaiveDate),
}

/// Supplier of ex-dividend dates.
#[allow(async_fn_in_trait)]
pub trait ExDividendSource {
    /// Ex-dividend dates for `symbol` within `from..=to`.
    async fn ex_dividend_dates(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, DividendError>;
}

/// Synchronous classifier: always unlabelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DividendExDateExtractor;

impl DividendExDateExtractor {
    pub fn extract(&self, _ts: i64) -> Option<String> {
        None
    }
}

/// `"ExDiv-T{+/-}n"` for the ex-date nearest to `date` within
/// [`DIVIDEND_WINDOW_DAYS`] calendar days, `None` otherwise.
pub async fn explain_dividend_window<S>(
    source: &S,
    symbol: &str,
    date: NaiveDate,
) -> Result<Option<String>, DividendError>
where
    S: ExDividendSource,
{
    let span = Duration::days(DIVIDEND_WINDOW_DAYS);
    let (Some(from), Some(to)) = (date.checked_sub_signed(span), date.checked_add_signed(span)) else {
        return Err(DividendError::OutOfRange(date));
    };
    let dates = source.ex_dividend_dates(symbol, from, to).await?;

    let nearest = dates
        .into_iter()
        .map(|ex| (date - ex).num_days())
        .filter(|offset| offset.abs() <= DIVIDEND_WINDOW_DAYS)
        .min_by_key(|offset| (offset.abs(), *offset));
    Ok(nearest.map(|offset| window_label("ExDiv", offset)))
}
