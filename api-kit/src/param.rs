use chrono::NaiveDate;

/// Scalar types accepted as query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Bool,
    Date,
}

/// Declaration of a single query parameter on an endpoint.
#[derive(Debug, Clone)]
pub struct QueryParam {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
}

impl QueryParam {
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }

    /// Name used on the wire; underscores are exposed as dashes.
    pub fn wire_name(&self) -> String {
        self.name.replace('_', "-")
    }
}

/// A query parameter value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ParamValue::Date(value) => Some(*value),
            _ => None,
        }
    }
}

impl ParamType {
    /// Coerces a raw query-string value. The error message names the
    /// wire-level parameter so it can be surfaced to the client as-is.
    pub fn coerce(self, raw: &str, wire_name: &str) -> std::result::Result<ParamValue, String> {
        match self {
            ParamType::Str => Ok(ParamValue::Str(raw.to_string())),
            ParamType::Int => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| format!("{wire_name} must be an integer")),
            ParamType::Bool => {
                let value = raw.trim().to_ascii_lowercase();
                match value.as_str() {
                    "" | "yes" | "on" | "true" | "1" => Ok(ParamValue::Bool(true)),
                    "no" | "off" | "false" | "0" => Ok(ParamValue::Bool(false)),
                    _ => Err(format!("{wire_name} must be a boolean")),
                }
            }
            ParamType::Date => raw
                .parse::<NaiveDate>()
                .map(ParamValue::Date)
                .map_err(|_| format!("{wire_name} must be a valid date")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_integers() {
        assert_eq!(
            ParamType::Int.coerce("42", "num"),
            Ok(ParamValue::Int(42))
        );
        assert_eq!(
            ParamType::Int.coerce("-3", "num"),
            Ok(ParamValue::Int(-3))
        );
        assert_eq!(
            ParamType::Int.coerce("abc", "num"),
            Err("num must be an integer".to_string())
        );
        assert_eq!(
            ParamType::Int.coerce("1.5", "num"),
            Err("num must be an integer".to_string())
        );
    }

    #[test]
    fn coerces_booleans() {
        for raw in ["", "yes", "on", "true", "1", "TRUE", " Yes "] {
            assert_eq!(
                ParamType::Bool.coerce(raw, "flag"),
                Ok(ParamValue::Bool(true)),
                "raw: {raw:?}"
            );
        }
        for raw in ["no", "off", "false", "0", "False"] {
            assert_eq!(
                ParamType::Bool.coerce(raw, "flag"),
                Ok(ParamValue::Bool(false)),
                "raw: {raw:?}"
            );
        }
        assert_eq!(
            ParamType::Bool.coerce("maybe", "flag"),
            Err("flag must be a boolean".to_string())
        );
    }

    #[test]
    fn coerces_dates() {
        assert_eq!(
            ParamType::Date.coerce("2024-05-01", "since"),
            Ok(ParamValue::Date(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
            ))
        );
        assert_eq!(
            ParamType::Date.coerce("not-a-date", "since"),
            Err("since must be a valid date".to_string())
        );
    }

    #[test]
    fn strings_pass_through() {
        assert_eq!(
            ParamType::Str.coerce("hello", "q"),
            Ok(ParamValue::Str("hello".to_string()))
        );
    }

    #[test]
    fn wire_names_use_dashes() {
        let param = QueryParam::required("opt_num", ParamType::Int);
        assert_eq!(param.wire_name(), "opt-num");
    }
}
