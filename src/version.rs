use std::fmt;
use std::str::FromStr;

use crate::error::ParseVersionError;

/// A four-part release version: `major.minor.revision.build`.
///
/// Versions are ordered lexicographically by major, then minor, then
/// revision, then build. Two versions are equal only when all four parts are.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseVersion {
    /// Major version number.
    pub major: i32,
    /// Minor version number.
    pub minor: i32,
    /// Revision number.
    pub revision: i32,
    /// Build number.
    pub build: i32,
}

impl ReleaseVersion {
    /// Version `0.0.0.0`.
    pub const ZERO: ReleaseVersion = ReleaseVersion::new(0, 0, 0, 0);

    /// Creates a version from its four parts. Values are taken as-is.
    pub const fn new(major: i32, minor: i32, revision: i32, build: i32) -> Self {
        Self {
            major,
            minor,
            revision,
            build,
        }
    }

    /// Returns version `0.0.0.0`.
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Parses a release tag such as `v1.2.3.4`.
    ///
    /// A leading `v` or `V` is removed, then the remainder is split on `.`.
    /// The first four segments become major, minor, revision and build; any
    /// further segments are ignored. Missing trailing parts are 0, so `v1.2`
    /// reads as `1.2.0.0`.
    ///
    /// Callers that want the zero version on failure can use
    /// `from_release_tag(tag).unwrap_or_default()`.
    pub fn from_release_tag(tag: &str) -> Result<Self, ParseVersionError> {
        let tag = tag.strip_prefix(['v', 'V']).unwrap_or(tag);
        if tag.is_empty() {
            return Err(ParseVersionError::Empty);
        }

        let mut parts = [0i32; 4];
        for (position, segment) in tag.split('.').take(parts.len()).enumerate() {
            let value: i32 = segment
                .parse()
                .map_err(|_| ParseVersionError::InvalidSegment {
                    position,
                    segment: segment.to_string(),
                })?;
            if value < 0 {
                return Err(ParseVersionError::NegativeSegment {
                    position,
                    segment: segment.to_string(),
                });
            }
            parts[position] = value;
        }

        let [major, minor, revision, build] = parts;
        Ok(Self::new(major, minor, revision, build))
    }

    /// Builds a version from the four numeric parts embedded in a binary.
    pub fn from_binary_version(binary: BinaryVersion) -> Self {
        Self::new(
            binary.major.into(),
            binary.minor.into(),
            binary.revision.into(),
            binary.build.into(),
        )
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            major,
            minor,
            revision,
            build,
        } = self;
        write!(f, "{major}.{minor}.{revision}.{build}")
    }
}

impl FromStr for ReleaseVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_release_tag(s)
    }
}

impl From<BinaryVersion> for ReleaseVersion {
    fn from(binary: BinaryVersion) -> Self {
        Self::from_binary_version(binary)
    }
}

/// The version stamped into a binary, as four 16-bit parts.
///
/// Use [`binary_version!`](crate::binary_version) to capture the version of
/// the crate being compiled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BinaryVersion {
    pub major: u16,
    pub minor: u16,
    pub revision: u16,
    pub build: u16,
}

impl BinaryVersion {
    /// Builds a binary version from the pieces Cargo exposes at compile time.
    ///
    /// An all-numeric `pre` is the build part (`1.2.3-4` gives `1.2.3.4`).
    /// Any other pre-release (`rc.4`, `beta-12`) gives the closest version
    /// below the final release, so `1.2.3-rc.4` is `1.2.2.65535` and still
    /// sorts under a `v1.2.3` tag. Parts larger than `u16::MAX` saturate.
    pub fn from_cargo_parts(major: &str, minor: &str, patch: &str, pre: &str) -> Self {
        let major = saturating_part(major);
        let minor = saturating_part(minor);
        let revision = saturating_part(patch);

        if pre.is_empty() || pre.bytes().all(|b| b.is_ascii_digit()) {
            return Self {
                major,
                minor,
                revision,
                build: saturating_part(pre),
            };
        }

        Self::preceding(major, minor, revision)
    }

    /// Greatest version below `major.minor.revision.0`, or zero if there is none.
    fn preceding(major: u16, minor: u16, revision: u16) -> Self {
        const MAX: u16 = u16::MAX;
        let (major, minor, revision, build) = match (major, minor, revision) {
            (0, 0, 0) => (0, 0, 0, 0),
            (major, 0, 0) => (major - 1, MAX, MAX, MAX),
            (major, minor, 0) => (major, minor - 1, MAX, MAX),
            (major, minor, revision) => (major, minor, revision - 1, MAX),
        };
        Self {
            major,
            minor,
            revision,
            build,
        }
    }
}

fn saturating_part(part: &str) -> u16 {
    part.parse::<u64>()
        .map_or(0, |value| u16::try_from(value).unwrap_or(u16::MAX))
}

/// Captures the version of the crate this macro is expanded in.
///
/// ```
/// let running = updatecheck::ReleaseVersion::from(updatecheck::binary_version!());
/// assert_eq!(running.build, 0);
/// ```
#[macro_export]
macro_rules! binary_version {
    () => {
        $crate::BinaryVersion::from_cargo_parts(
            env!("CARGO_PKG_VERSION_MAJOR"),
            env!("CARGO_PKG_VERSION_MINOR"),
            env!("CARGO_PKG_VERSION_PATCH"),
            env!("CARGO_PKG_VERSION_PRE"),
        )
    };
}
