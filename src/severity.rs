//! Severity scale for diagnostic messages.
//!
//! Every [`Message`](crate::Message) carries exactly one [`Severity`]. The
//! levels form an ordered scale, but each level is also an independent bit
//! flag so that ranges ("warning or worse") can be expressed as a
//! [`SeverityMask`] and tested with a single bitwise check.

use std::fmt;

/// The importance of a diagnostic message, from least to most severe.
///
/// Levels are ordered (`Log < Success < ... < Exception`) and each level
/// occupies its own bit, so a set of levels can be represented by a
/// [`SeverityMask`].
///
/// # Example
///
/// ```rust
/// use acumulus_api::{Severity, SeverityMask};
///
/// assert!(Severity::Error > Severity::Warning);
/// assert!(SeverityMask::WARNING_OR_WORSE.contains(Severity::Exception));
/// assert!(!SeverityMask::WARNING_OR_WORSE.contains(Severity::Notice));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Severity {
    /// No severity known; the value of an empty collection.
    Unknown = 0x00,
    /// Purely informational log entry; never influences overall health.
    Log = 0x01,
    /// An operation completed successfully.
    Success = 0x02,
    /// Informational message the user may want to see.
    Info = 0x04,
    /// A notice: more prominent than info, not yet a problem.
    Notice = 0x08,
    /// Something went wrong but the operation completed.
    Warning = 0x10,
    /// The operation failed.
    Error = 0x20,
    /// A failure at the level of a caught exception or remote fault.
    Exception = 0x40,
}

impl Severity {
    /// Returns the bit flag value of this severity.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Returns the human-readable label used when formatting messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Log => "Log",
            Self::Success => "Success",
            Self::Info => "Info",
            Self::Notice => "Notice",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Exception => "Exception",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of [`Severity`] levels, used to filter or range-test messages.
///
/// Masks combine with [`SeverityMask::union`] and are tested with
/// [`SeverityMask::contains`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeverityMask(u16);

impl SeverityMask {
    /// Every level, including [`Severity::Log`].
    pub const ALL: Self = Self(0x7f);

    /// Levels that count towards overall health: [`Severity::Info`] or worse.
    ///
    /// [`Severity::Log`] and [`Severity::Success`] entries are diagnostics
    /// about a healthy run and are excluded here.
    pub const REAL_MESSAGES: Self = Self(
        Severity::Info.bits()
            | Severity::Notice.bits()
            | Severity::Warning.bits()
            | Severity::Error.bits()
            | Severity::Exception.bits(),
    );

    /// [`Severity::Warning`] or worse.
    pub const WARNING_OR_WORSE: Self =
        Self(Severity::Warning.bits() | Severity::Error.bits() | Severity::Exception.bits());

    /// [`Severity::Error`] or worse.
    pub const ERROR_OR_WORSE: Self = Self(Severity::Error.bits() | Severity::Exception.bits());

    /// Creates a mask containing exactly one level.
    #[must_use]
    pub const fn only(severity: Severity) -> Self {
        Self(severity.bits())
    }

    /// Returns the union of two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if `severity` is in this mask.
    #[must_use]
    pub const fn contains(self, severity: Severity) -> bool {
        self.0 & severity.bits() != 0
    }
}
