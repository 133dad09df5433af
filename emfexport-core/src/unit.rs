// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Translation of OpenTelemetry unit strings onto
//! [CloudWatch units](https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_MetricDatum.html).
//!
//! OpenTelemetry metrics carry [UCUM](https://ucum.org/)-style unit symbols such as `ms` or `By`,
//! while CloudWatch expects names such as `Milliseconds` or `Bytes`. [`translate_unit`] does the
//! conversion, honoring any per-metric [descriptor](crate::MetricDescriptor) overrides.
//!
//! ```
//! # use emfexport_core::{MetricDescriptors, translate_unit};
//! let descriptors = MetricDescriptors::default();
//! assert_eq!(translate_unit("latency", "ms", &descriptors), "Milliseconds");
//! assert_eq!(translate_unit("latency", "{requests}", &descriptors), "{requests}");
//! ```

use std::{borrow::Cow, fmt};

use crate::config::MetricDescriptors;

/// All metric units known to CloudWatch.
#[non_exhaustive]
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// No Unit
    #[default]
    None,
    /// Count
    Count,
    /// Count/Second
    CountPerSecond,
    /// Percent
    Percent,
    /// Seconds with a scale prefix
    Second(NegativeScale),
    /// Bytes with a scale prefix
    Byte(PositiveScale),
    /// Bytes/second with a scale prefix
    BytePerSecond(PositiveScale),
    /// Bits with a scale prefix
    Bit(PositiveScale),
    /// Bits/second with a scale prefix
    BitPerSecond(PositiveScale),
}

/// Supported *negative* power-of-ten scales for [`Unit`]s.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NegativeScale {
    /// `10^-6`
    Micro,
    /// `10^-3`
    Milli,
    #[default]
    /// `10^0`
    One,
}

/// Supported *positive* power-of-ten scales for [`Unit`]s.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PositiveScale {
    /// `10^0`
    #[default]
    One,
    /// `10^3`
    Kilo,
    /// `10^6`
    Mega,
    /// `10^9`
    Giga,
    /// `10^12`
    Tera,
}

const POSITIVE_SCALES: [PositiveScale; 5] = [
    PositiveScale::One,
    PositiveScale::Kilo,
    PositiveScale::Mega,
    PositiveScale::Giga,
    PositiveScale::Tera,
];

impl Unit {
    /// The public name defined by CloudWatch for the unit.
    pub const fn name(self) -> &'static str {
        macro_rules! positive_scale {
            ($scale:expr, $base:literal, $scaled:literal) => {
                match $scale {
                    PositiveScale::One => $base,
                    PositiveScale::Kilo => concat!("Kilo", $scaled),
                    PositiveScale::Mega => concat!("Mega", $scaled),
                    PositiveScale::Giga => concat!("Giga", $scaled),
                    PositiveScale::Tera => concat!("Tera", $scaled),
                }
            };
        }

        match self {
            Self::None => "None",
            Self::Count => "Count",
            Self::CountPerSecond => "Count/Second",
            Self::Percent => "Percent",
            Self::Second(scale) => match scale {
                NegativeScale::Micro => "Microseconds",
                NegativeScale::Milli => "Milliseconds",
                NegativeScale::One => "Seconds",
            },
            Self::Byte(scale) => positive_scale!(scale, "Bytes", "bytes"),
            Self::BytePerSecond(scale) => positive_scale!(scale, "Bytes/Second", "bytes/Second"),
            Self::Bit(scale) => positive_scale!(scale, "Bits", "bits"),
            Self::BitPerSecond(scale) => positive_scale!(scale, "Bits/Second", "bits/Second"),
        }
    }

    /// Map an OpenTelemetry unit symbol onto its CloudWatch unit.
    ///
    /// Only a fixed set of symbols is recognized; anything else gives `None` and is expected to be
    /// passed through unchanged.
    pub fn from_otel_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "ms" => Self::Second(NegativeScale::Milli),
            "s" => Self::Second(NegativeScale::One),
            "us" => Self::Second(NegativeScale::Micro),
            "By" => Self::Byte(PositiveScale::One),
            "Bi" => Self::Bit(PositiveScale::One),
            _ => return None,
        })
    }

    /// Look up a unit by its CloudWatch name, for example `"Kilobytes/Second"`.
    ///
    /// Returns `None` if `name` is not a CloudWatch unit.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().find(|unit| unit.name() == name)
    }

    fn all() -> impl Iterator<Item = Self> {
        let fixed = [
            Self::None,
            Self::Count,
            Self::CountPerSecond,
            Self::Percent,
            Self::Second(NegativeScale::Micro),
            Self::Second(NegativeScale::Milli),
            Self::Second(NegativeScale::One),
        ];
        let scaled = POSITIVE_SCALES.into_iter().flat_map(|scale| {
            [
                Self::Byte(scale),
                Self::BytePerSecond(scale),
                Self::Bit(scale),
                Self::BitPerSecond(scale),
            ]
        });
        fixed.into_iter().chain(scaled)
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Translate the raw unit of the metric `metric_name` into the unit string to emit.
///
/// If `descriptors` has an entry for the metric, its unit is used when the raw unit is empty or
/// when the descriptor is marked as overwriting. Otherwise known OpenTelemetry symbols are mapped
/// with [`Unit::from_otel_symbol`], and any other unit is passed through as is.
///
/// This never fails.
pub fn translate_unit<'a>(
    metric_name: &str,
    raw_unit: &'a str,
    descriptors: &'a MetricDescriptors,
) -> Cow<'a, str> {
    if let Some(descriptor) = descriptors.get(metric_name) {
        if raw_unit.is_empty() || descriptor.overwrite {
            return Cow::Borrowed(&descriptor.unit);
        }
    }
    match Unit::from_otel_symbol(raw_unit) {
        Some(unit) => Cow::Borrowed(unit.name()),
        None => Cow::Borrowed(raw_unit),
    }
}
