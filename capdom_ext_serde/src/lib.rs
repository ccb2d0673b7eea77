#[cfg(feature = "serde_deser_unquoted_bigdecimal")]
mod big_decimal_exact {
    use std::fmt;
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde::{Deserializer, Deserialize};
    use serde::de::{self, Visitor, MapAccess};
    use serde_with::DeserializeAs;

    /// Deserializes a JSON number (or a quoted decimal string) into a `BigDecimal`
    /// without passing through `f64`.
    ///
    /// With `serde_json/arbitrary_precision` enabled, numbers reach the visitor as
    /// a single-entry map holding the original text, which is parsed verbatim.
    pub struct BigDecimalExact;

    struct BigDecimalExactVisitor;

    impl<'de> Visitor<'de> for BigDecimalExactVisitor {
        type Value = BigDecimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal number or a decimal string")
        }

        fn visit_i64<E>(self, value: i64) -> Result<BigDecimal, E>
            where
                E: de::Error,
        {
            Ok(BigDecimal::from(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<BigDecimal, E>
            where
                E: de::Error,
        {
            Ok(BigDecimal::from(value))
        }

        fn visit_f64<E>(self, value: f64) -> Result<BigDecimal, E>
            where
                E: de::Error,
        {
            BigDecimal::from_str(&value.to_string()).map_err(de::Error::custom)
        }

        fn visit_str<E>(self, value: &str) -> Result<BigDecimal, E>
            where
                E: de::Error,
        {
            BigDecimal::from_str(value.trim()).map_err(de::Error::custom)
        }

        fn visit_map<M>(self, map: M) -> Result<BigDecimal, M::Error>
            where
                M: MapAccess<'de>,
        {
            let number = serde_json::Number::deserialize(de::value::MapAccessDeserializer::new(map))?;
            BigDecimal::from_str(&number.to_string()).map_err(de::Error::custom)
        }
    }

    impl<'de> DeserializeAs<'de, BigDecimal> for BigDecimalExact
    {
        fn deserialize_as<D>(deserializer: D) -> Result<BigDecimal, D::Error>
            where
                D: Deserializer<'de>,
        {
            deserializer.deserialize_any(BigDecimalExactVisitor)
        }
    }

}

#[cfg(feature = "serde_deser_unquoted_bigdecimal")]
pub use big_decimal_exact::*;
