//! Prometheus instruments for the allocation engine.
//!
//! - `pawctl_bookings_confirmed_total{session_type}`: booking rows committed
//! - `pawctl_subscription_days_debited_total`: days moved from remaining to used
//! - `pawctl_confirmations_rejected_total{reason}`: confirmations that returned an error
//! - `pawctl_confirmation_duration_seconds{outcome}`: wall time of `confirm`

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::models::SessionType;

#[derive(Clone)]
pub struct BookingMetrics {
    bookings_confirmed: IntCounterVec,
    days_debited: IntCounter,
    confirmations_rejected: IntCounterVec,
    confirmation_duration: HistogramVec,
    registry: Registry,
}

impl BookingMetrics {
    /// Create the instruments and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let bookings_confirmed = IntCounterVec::new(
            Opts::new("pawctl_bookings_confirmed_total", "Booking rows committed by confirmations"),
            &["session_type"],
        )?;
        registry.register(Box::new(bookings_confirmed.clone()))?;

        let days_debited = IntCounter::new(
            "pawctl_subscription_days_debited_total",
            "Subscription days moved from remaining to used",
        )?;
        registry.register(Box::new(days_debited.clone()))?;

        let confirmations_rejected = IntCounterVec::new(
            Opts::new("pawctl_confirmations_rejected_total", "Confirmations rejected, by reason"),
            &["reason"],
        )?;
        registry.register(Box::new(confirmations_rejected.clone()))?;

        let confirmation_duration = HistogramVec::new(
            HistogramOpts::new("pawctl_confirmation_duration_seconds", "Time spent confirming a selection")
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(confirmation_duration.clone()))?;

        Ok(Self {
            bookings_confirmed,
            days_debited,
            confirmations_rejected,
            confirmation_duration,
            registry: registry.clone(),
        })
    }

    pub fn record_confirmed(&self, session_type: SessionType, bookings: usize, days: u64, seconds: f64) {
        self.bookings_confirmed
            .with_label_values(&[session_type.as_str()])
            .inc_by(bookings as u64);
        self.days_debited.inc_by(days);
        self.confirmation_duration.with_label_values(&["confirmed"]).observe(seconds);
    }

    pub fn record_rejected(&self, reason: &str, seconds: f64) {
        self.confirmations_rejected.with_label_values(&[reason]).inc();
        self.confirmation_duration.with_label_values(&["rejected"]).observe(seconds);
    }

    /// Text exposition of everything in the registry
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_records_bookings_and_days() {
        let registry = Registry::new();
        let metrics = BookingMetrics::new(&registry).unwrap();

        metrics.record_confirmed(SessionType::FullDay, 3, 3, 0.02);
        metrics.record_confirmed(SessionType::HalfDay, 1, 1, 0.01);

        assert_eq!(metrics.bookings_confirmed.with_label_values(&["full_day"]).get(), 3);
        assert_eq!(metrics.bookings_confirmed.with_label_values(&["half_day"]).get(), 1);
        assert_eq!(metrics.days_debited.get(), 4);
    }

    #[test]
    fn test_rejections_are_labelled_by_reason() {
        let registry = Registry::new();
        let metrics = BookingMetrics::new(&registry).unwrap();

        metrics.record_rejected("insufficient_days_remaining", 0.001);
        metrics.record_rejected("insufficient_days_remaining", 0.001);

        assert_eq!(
            metrics
                .confirmations_rejected
                .with_label_values(&["insufficient_days_remaining"])
                .get(),
            2
        );
        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("pawctl_confirmations_rejected_total"));
        assert!(rendered.contains("insufficient_days_remaining"));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        BookingMetrics::new(&registry).unwrap();
        assert!(BookingMetrics::new(&registry).is_err());
    }
}
