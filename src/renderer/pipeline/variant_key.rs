//! Variant keys.
//!
//! Every program template declares an ordered list of [`OptionSpec`]s. At
//! registration each spec is resolved once into a [`ResolvedOption`] that
//! owns its bit offset and width; a [`VariantKey`] is the OR of every
//! resolved option's encoding of the supplied value.
//!
//! | Kind | Width | Encoding |
//! |------|-------|----------|
//! | `Flag` | 1 bit | `1 << offset` when truthy |
//! | `Range { min, max }` | `ceil((max - min) / 2)` bits | `(value - min) << offset` |
//!
//! The range width is narrower than `log2(max - min + 1)` for larger spans.
//! Such declarations are accepted (keys stay deterministic) but logged at
//! registration, since values near `max` then spill into the next option's
//! bits.

use serde::{Deserialize, Serialize};

use crate::resources::{OptionValue, ShaderOptions};

/// Identity of one compiled program variant within a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VariantKey(pub u64);

impl VariantKey {
    #[inline]
    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }
}

/// Declaration of one template option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionSpec {
    Range { name: String, min: i32, max: i32 },
    Flag { name: String },
}

impl OptionSpec {
    pub fn flag(name: impl Into<String>) -> Self {
        OptionSpec::Flag { name: name.into() }
    }

    pub fn range(name: impl Into<String>, min: i32, max: i32) -> Self {
        OptionSpec::Range {
            name: name.into(),
            min,
            max,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            OptionSpec::Flag { name } | OptionSpec::Range { name, .. } => name,
        }
    }

    /// Bits reserved for this option.
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            OptionSpec::Flag { .. } => 1,
            OptionSpec::Range { min, max, .. } => {
                let span = (i64::from(*max) - i64::from(*min)).max(0) as u64;
                span.div_ceil(2) as u32
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Range { min: i32, max: i32 },
}

/// An option with its bit position fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOption {
    pub name: String,
    pub kind: OptionKind,
    pub offset: u32,
    pub width: u32,
}

impl ResolvedOption {
    /// This option's contribution to a variant key.
    #[must_use]
    pub fn encode(&self, value: OptionValue) -> u64 {
        let bits = match self.kind {
            OptionKind::Flag => u64::from(value.is_truthy()),
            OptionKind::Range { min, .. } => {
                let delta = i64::from(value.as_int()) - i64::from(min);
                if delta < 0 {
                    log::warn!(
                        "Option {} value {} is below its minimum {min}.",
                        self.name,
                        value.as_int()
                    );
                }
                delta.max(0) as u64
            }
        };
        bits.checked_shl(self.offset).unwrap_or(0)
    }

    /// Reads this option's value back out of `key`.
    #[must_use]
    pub fn decode(&self, key: VariantKey) -> OptionValue {
        let raw = key.0.checked_shr(self.offset).unwrap_or(0);
        match self.kind {
            OptionKind::Flag => OptionValue::Bool(raw & 1 == 1),
            OptionKind::Range { min, .. } => {
                let mask = 1_u64.checked_shl(self.width).map_or(u64::MAX, |m| m - 1);
                OptionValue::Int(min.wrapping_add((raw & mask) as i32))
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self.kind, OptionKind::Flag)
    }
}

/// Assigns cumulative offsets in declaration order.
///
/// `template` is only used for diagnostics.
#[must_use]
pub fn resolve_options(template: &str, specs: &[OptionSpec]) -> Vec<ResolvedOption> {
    let mut offset = 0_u32;
    let mut resolved = Vec::with_capacity(specs.len());

    for spec in specs {
        let width = spec.width();
        let kind = match spec {
            OptionSpec::Flag { .. } => OptionKind::Flag,
            OptionSpec::Range { min, max, .. } => {
                let span = (i64::from(*max) - i64::from(*min)).max(0) as u64;
                let needed = u64::BITS - span.leading_zeros();
                if width < needed {
                    log::warn!(
                        "Template {template}: option {} reserves {width} bit(s) for range [{min}, {max}] \
                         which needs {needed}; high values overlap the next option.",
                        spec.name()
                    );
                }
                OptionKind::Range {
                    min: *min,
                    max: *max,
                }
            }
        };

        let end = offset.saturating_add(width);
        if end > u64::BITS {
            log::error!(
                "Template {template}: option {} does not fit in a 64-bit variant key.",
                spec.name()
            );
        }

        resolved.push(ResolvedOption {
            name: spec.name().to_owned(),
            kind,
            offset,
            width,
        });
        offset = end;
    }

    resolved
}

/// ORs the encodings of every declared option present in `values`.
///
/// Absent options contribute nothing; undeclared names are ignored.
#[must_use]
pub fn derive_key(options: &[ResolvedOption], values: &ShaderOptions) -> VariantKey {
    let bits = options
        .iter()
        .filter_map(|opt| values.get(&opt.name).map(|v| opt.encode(v)))
        .fold(0, |acc, bits| acc | bits);
    VariantKey(bits)
}
