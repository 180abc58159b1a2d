use tracing::{debug, warn};

use crate::domain::models::{PiApproximation, UnavailableReason, Verification, VerificationConfig};
use crate::domain::ports::ReferenceSource;

/// Default digit count above which verification is skipped
pub const DEFAULT_CEILING: u64 = 10_000;

/// Compares finalized digits against a reference expansion of pi
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verifier {
    ceiling: u64,
}

impl Verifier {
    pub const fn new(ceiling: u64) -> Self {
        Self { ceiling }
    }

    /// Build from config; a disabled verifier has a ceiling of zero.
    pub const fn from_config(config: &VerificationConfig) -> Self {
        if config.enabled {
            Self::new(config.ceiling)
        } else {
            Self::new(0)
        }
    }

    pub const fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Number of leading characters compared for `target` digits: the
    /// integer digit, the point, and `target - 1` fraction digits.
    pub const fn comparison_window(target: u64) -> usize {
        if target <= 1 {
            1
        } else {
            target as usize + 1
        }
    }

    /// Compare `digits` (the rendered result) with `reference`.
    ///
    /// Both strings are cut to the same window before a character-wise
    /// comparison. The reported index is 0-based and counts the decimal point.
    pub fn verify(&self, digits: &str, target: u64, reference: Option<&str>) -> Verification {
        if self.ceiling == 0 {
            return Verification::unavailable(UnavailableReason::Disabled);
        }
        if target >= self.ceiling {
            return Verification::unavailable(UnavailableReason::AboveCeiling {
                digits: target,
                ceiling: self.ceiling,
            });
        }
        let Some(reference) = reference else {
            return Verification::unavailable(UnavailableReason::NoReference);
        };

        let window = Self::comparison_window(target);
        let reference = reference.trim().as_bytes();
        if reference.len() < window {
            return Verification::unavailable(UnavailableReason::ReferenceTooShort {
                available: reference.len(),
                required: window,
            });
        }

        let expected = &reference[..window];
        let actual = digits.as_bytes();
        let mismatch = (0..window).find(|&i| actual.get(i) != expected.get(i));

        match mismatch {
            None => Verification::matched(),
            Some(index) => {
                debug!(index, target, "Result diverges from reference");
                Verification::mismatch_at(index)
            }
        }
    }

    /// Load the reference from `source` and verify `approximation` against it.
    ///
    /// Read failures are logged and reported as a missing reference; they
    /// never invalidate the computed result.
    pub async fn verify_against(
        &self,
        approximation: &PiApproximation,
        source: &dyn ReferenceSource,
    ) -> Verification {
        if self.ceiling == 0 {
            return Verification::unavailable(UnavailableReason::Disabled);
        }
        if approximation.digits >= self.ceiling {
            // Skip the read entirely.
            return self.verify("", approximation.digits, None);
        }

        let reference = match source.load_reference().await {
            Ok(reference) => reference,
            Err(e) => {
                warn!(error = %e, "Reference unreadable, skipping verification");
                None
            }
        };
        self.verify(
            &approximation.digit_string(),
            approximation.digits,
            reference.as_deref(),
        )
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RunStats;
    use crate::domain::ports::StorageError;
    use async_trait::async_trait;
    use std::path::PathBuf;

    const REFERENCE: &str = "3.14159265358979323846264338327950288419716939937510\n";

    struct StaticReference(Option<&'static str>);

    #[async_trait]
    impl ReferenceSource for StaticReference {
        async fn load_reference(&self) -> Result<Option<String>, StorageError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct BrokenReference;

    #[async_trait]
    impl ReferenceSource for BrokenReference {
        async fn load_reference(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::ReferenceRead {
                path: PathBuf::from("pi_reference.txt"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    fn approximation(digits: &str, target: u64) -> PiApproximation {
        PiApproximation {
            value: digits.parse().unwrap(),
            digits: target,
            stats: RunStats::default(),
        }
    }

    #[test]
    fn test_comparison_window() {
        assert_eq!(Verifier::comparison_window(1), 1);
        assert_eq!(Verifier::comparison_window(2), 3);
        assert_eq!(Verifier::comparison_window(10), 11);
    }

    #[test]
    fn test_ten_digits_match() {
        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3.141592653", 10, Some(REFERENCE)),
            Verification::matched()
        );
    }

    #[test]
    fn test_one_digit_match() {
        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3", 1, Some(REFERENCE)),
            Verification::matched()
        );
    }

    #[test]
    fn test_corrupted_reference_reports_position() {
        let mut corrupted = REFERENCE.to_string();
        corrupted.replace_range(5..6, "0");

        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3.141592653", 10, Some(&corrupted)),
            Verification::mismatch_at(5)
        );
    }

    #[test]
    fn test_mismatch_beyond_window_ignored() {
        // Differs at index 12, outside the 11-character window.
        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3.141592653", 10, Some("3.14159265350000")),
            Verification::matched()
        );
    }

    #[test]
    fn test_short_result_mismatches_at_end() {
        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3.1415", 10, Some(REFERENCE)),
            Verification::mismatch_at(6)
        );
    }

    #[test]
    fn test_above_ceiling() {
        let verifier = Verifier::new(100);
        assert_eq!(
            verifier.verify("3.14", 100, Some(REFERENCE)),
            Verification::unavailable(UnavailableReason::AboveCeiling {
                digits: 100,
                ceiling: 100,
            })
        );
        // One below the ceiling is still checked.
        assert!(!matches!(
            verifier.verify("3.14", 99, Some(REFERENCE)),
            Verification::Unavailable {
                reason: UnavailableReason::AboveCeiling { .. }
            }
        ));
    }

    #[test]
    fn test_reference_too_short() {
        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3.141592653", 10, Some("3.14159 ")),
            Verification::unavailable(UnavailableReason::ReferenceTooShort {
                available: 7,
                required: 11,
            })
        );
    }

    #[test]
    fn test_missing_reference() {
        let verifier = Verifier::default();
        assert_eq!(
            verifier.verify("3.141592653", 10, None),
            Verification::unavailable(UnavailableReason::NoReference)
        );
    }

    #[test]
    fn test_disabled_from_config() {
        let config = VerificationConfig {
            enabled: false,
            ..VerificationConfig::default()
        };
        let verifier = Verifier::from_config(&config);
        assert_eq!(
            verifier.verify("3.141592653", 10, Some(REFERENCE)),
            Verification::unavailable(UnavailableReason::Disabled)
        );
    }

    #[tokio::test]
    async fn test_verify_against_source() {
        let verifier = Verifier::default();
        let pi = approximation("3.141592653", 10);

        let result = verifier
            .verify_against(&pi, &StaticReference(Some(REFERENCE)))
            .await;
        assert_eq!(result, Verification::matched());

        let result = verifier.verify_against(&pi, &StaticReference(None)).await;
        assert_eq!(
            result,
            Verification::unavailable(UnavailableReason::NoReference)
        );
    }

    #[tokio::test]
    async fn test_unreadable_reference_is_not_fatal() {
        let verifier = Verifier::default();
        let pi = approximation("3.141592653", 10);
        let result = verifier.verify_against(&pi, &BrokenReference).await;
        assert_eq!(
            result,
            Verification::unavailable(UnavailableReason::NoReference)
        );
    }
}
