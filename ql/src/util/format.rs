use num_format::{CustomFormat, Grouping};

/// Groups digits with `_`, e.g. `1_250_000`
pub fn number_format() -> CustomFormat {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .minus_sign("-")
        .separator("_")
        .build()
        .expect("static number format definition")
}

#[cfg(test)]
mod tests {
    use num_format::ToFormattedString;

    use super::*;

    #[test]
    fn test_number_format() {
        let f = number_format();
        assert_eq!(50_001_usize.to_formatted_string(&f), "50_001");
        assert_eq!(999_usize.to_formatted_string(&f), "999");
    }
}
