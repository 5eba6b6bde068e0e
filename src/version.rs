use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One 16-bit component of a packed 64-bit version number.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    Major,
    Minor,
    Patch,
    Build,
}

impl Field {
    /// Right-shift that brings this component into the low 16 bits.
    pub fn shift(self) -> u32 {
        match self {
            Field::Major => 48,
            Field::Minor => 32,
            Field::Patch => 16,
            Field::Build => 0,
        }
    }

    /// Pull this component out of a packed version.
    #[inline]
    pub fn extract(self, packed: u64) -> u16 {
        ((packed >> self.shift()) & 0xffff) as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Major => "major",
            Field::Minor => "minor",
            Field::Patch => "patch",
            Field::Build => "build",
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    /// Case-insensitive. The error carries the token as given.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Field::Major),
            "minor" => Ok(Field::Minor),
            "patch" => Ok(Field::Patch),
            "build" => Ok(Field::Build),
            _ => Err(Error::InvalidField(s.to_owned())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 4-part version number, usually unpacked from file_version or product_version fields of
/// FixedFileInfo. A u64 is treated as 4 16-bit components. Version.0 is the highest 16 bits and
/// Version.3 is the lowest 16 bits.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Version(pub u16, pub u16, pub u16, pub u16);

impl Version {
    pub fn get(&self, field: Field) -> u16 {
        match field {
            Field::Major => self.0,
            Field::Minor => self.1,
            Field::Patch => self.2,
            Field::Build => self.3,
        }
    }
}

impl From<u64> for Version {
    fn from(n: u64) -> Self {
        Self(
            Field::Major.extract(n),
            Field::Minor.extract(n),
            Field::Patch.extract(n),
            Field::Build.extract(n),
        )
    }
}

impl From<Version> for u64 {
    fn from(v: Version) -> u64 {
        ((v.0 as u64) << 48) | ((v.1 as u64) << 32) | ((v.2 as u64) << 16) | (v.3 as u64)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0, self.1, self.2, self.3)
    }
}

/// Output template: which components to print, and in what order.
///
/// Parsed from a dot-separated list of field names such as `major.minor` or `build.major`.
/// Repeated fields are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format(Vec<Field>);

impl Format {
    pub const DEFAULT: &'static str = "major.minor.patch.build";

    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    /// Render a packed version with this template, e.g. `1.2` for `major.minor` on 1.2.3.4.
    pub fn render(&self, packed: u64) -> String {
        let version = Version::from(packed);
        self.0
            .iter()
            .map(|&field| version.get(field).to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Default for Format {
    fn default() -> Self {
        Self(vec![Field::Major, Field::Minor, Field::Patch, Field::Build])
    }
}

impl FromStr for Format {
    type Err = Error;

    /// Stops at the first unknown token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('.')
            .map(str::parse)
            .collect::<Result<Vec<Field>, _>>()
            .map(Self)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// Format a packed version according to a dot-separated template.
pub fn render(packed: u64, format: &str) -> Result<String, Error> {
    let format: Format = format.parse()?;
    Ok(format.render(packed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const V1234: u64 = 0x0001_0002_0003_0004;

    #[test]
    fn default_format_prints_all_four() {
        assert_eq!(render(V1234, Format::DEFAULT).unwrap(), "1.2.3.4");
        assert_eq!(Format::default().render(V1234), "1.2.3.4");
        assert_eq!(Format::default().to_string(), Format::DEFAULT);
    }

    #[test]
    fn subset_and_reorder() {
        assert_eq!(render(V1234, "major.minor").unwrap(), "1.2");
        assert_eq!(render(V1234, "build.major").unwrap(), "4.1");
        assert_eq!(render(V1234, "patch").unwrap(), "3");
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(render(V1234, "major.major").unwrap(), "1.1");
        let fmt: Format = "build.build.minor".parse().unwrap();
        assert_eq!(fmt.fields(), &[Field::Build, Field::Build, Field::Minor]);
    }

    #[test]
    fn tokens_are_case_insensitive() {
        assert_eq!(render(V1234, "Major.MINOR").unwrap(), "1.2");
        assert_eq!("PaTcH".parse::<Field>().unwrap(), Field::Patch);
    }

    #[test]
    fn no_zero_padding() {
        let packed = u64::from(Version(10, 0, 65535, 7));
        assert_eq!(render(packed, Format::DEFAULT).unwrap(), "10.0.65535.7");
    }

    #[test]
    fn unknown_token_is_reported_verbatim() {
        match render(V1234, "major.Bogus.minor") {
            Err(Error::InvalidField(tok)) => assert_eq!(tok, "Bogus"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn empty_tokens_are_invalid() {
        assert!(matches!(render(V1234, ""), Err(Error::InvalidField(t)) if t.is_empty()));
        assert!(matches!(render(V1234, "major..minor"), Err(Error::InvalidField(_))));
        assert!(matches!(render(V1234, "major."), Err(Error::InvalidField(_))));
    }

    #[test]
    fn version_display() {
        assert_eq!(Version::from(V1234).to_string(), "1.2.3.4");
        assert_eq!(Version::from(V1234), Version(1, 2, 3, 4));
    }

    proptest! {
        #[test]
        fn default_render_matches_shift_and_mask(v in any::<u64>()) {
            let expected = format!(
                "{}.{}.{}.{}",
                (v >> 48) & 0xffff,
                (v >> 32) & 0xffff,
                (v >> 16) & 0xffff,
                v & 0xffff,
            );
            prop_assert_eq!(render(v, "major.minor.patch.build").unwrap(), expected);
        }

        #[test]
        fn render_ignores_case(
            v in any::<u64>(),
            fmt in "(major|minor|patch|build)(\\.(major|minor|patch|build)){0,5}",
        ) {
            let lower = render(v, &fmt).unwrap();
            prop_assert_eq!(render(v, &fmt.to_uppercase()).unwrap(), lower);
        }

        #[test]
        fn bogus_always_fails(v in any::<u64>()) {
            let result = render(v, "bogus");
            prop_assert!(matches!(result, Err(Error::InvalidField(ref t)) if t == "bogus"));
        }

        #[test]
        fn version_u64_roundtrip(v in any::<u64>()) {
            prop_assert_eq!(u64::from(Version::from(v)), v);
        }
    }
}
