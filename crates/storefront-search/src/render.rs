use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use storefront_core::{AssignedAttribute, AttributeInputType};

use crate::editorjs::clean_editor_js_text;

/// The document and the vector render numeric and date values differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Document,
    Vector,
}

/// Searchable texts of one assigned attribute, in value order. Input types
/// without a text form yield nothing.
pub(crate) fn attribute_value_texts(assigned: &AssignedAttribute, target: Target) -> Vec<String> {
    let attribute = &assigned.attribute;
    let values = assigned.values.iter();

    match attribute.input_type {
        AttributeInputType::Dropdown | AttributeInputType::Multiselect => {
            values.map(|value| value.name.clone()).collect()
        }
        AttributeInputType::RichText => values
            .map(|value| {
                value
                    .rich_text
                    .as_ref()
                    .map(clean_editor_js_text)
                    .unwrap_or_default()
            })
            .collect(),
        AttributeInputType::Numeric => {
            let unit = attribute.unit.as_deref().unwrap_or_default();
            values
                .map(|value| match target {
                    Target::Document => format!("{}{unit}", value.name),
                    Target::Vector if unit.is_empty() => value.name.clone(),
                    Target::Vector => format!("{} {unit}", value.name),
                })
                .collect()
        }
        AttributeInputType::Date | AttributeInputType::DateTime => values
            .filter_map(|value| value.date_time)
            .map(|date_time| match target {
                Target::Document => iso_format(&date_time),
                Target::Vector => date_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            })
            .collect(),
        AttributeInputType::File
        | AttributeInputType::Reference
        | AttributeInputType::PlainText
        | AttributeInputType::Swatch
        | AttributeInputType::Boolean => Vec::new(),
    }
}

/// Whole seconds, or six fractional digits when the value has any.
fn iso_format(date_time: &DateTime<Utc>) -> String {
    let precision = if date_time.nanosecond() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    date_time.to_rfc3339_opts(precision, false)
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use storefront_core::AttributeInputType;

    use super::fixtures::{assigned, value};
    use super::*;

    #[test]
    fn numeric_values_get_unit_suffix() {
        let weight = assigned(
            "weight",
            AttributeInputType::Numeric,
            Some("kg"),
            vec![value("2.5")],
        );

        assert_eq!(attribute_value_texts(&weight, Target::Document), vec!["2.5kg"]);
        assert_eq!(attribute_value_texts(&weight, Target::Vector), vec!["2.5 kg"]);
    }

    #[test]
    fn numeric_values_without_unit() {
        let count = assigned("pieces", AttributeInputType::Numeric, None, vec![value("3")]);
        assert_eq!(attribute_value_texts(&count, Target::Document), vec!["3"]);
        assert_eq!(attribute_value_texts(&count, Target::Vector), vec!["3"]);
    }

    #[test]
    fn fractional_seconds_render_as_microseconds() {
        let mut release = value("release");
        release.date_time = Some(
            Utc.with_ymd_and_hms(2021, 6, 23, 10, 0, 0).unwrap() + Duration::milliseconds(123),
        );
        let mut launch = value("launch");
        launch.date_time = Some(Utc.with_ymd_and_hms(2021, 6, 23, 10, 0, 5).unwrap());
        let dates = assigned("release", AttributeInputType::DateTime, None, vec![release, launch]);

        assert_eq!(
            attribute_value_texts(&dates, Target::Document),
            vec!["2021-06-23T10:00:00.123000+00:00", "2021-06-23T10:00:05+00:00"]
        );
        assert_eq!(
            attribute_value_texts(&dates, Target::Vector),
            vec!["2021-06-23 10:00:00", "2021-06-23 10:00:05"]
        );
    }

    #[test]
    fn dates_without_timestamp_are_skipped() {
        let release = assigned("release", AttributeInputType::DateTime, None, vec![value("x")]);
        assert!(attribute_value_texts(&release, Target::Document).is_empty());
    }

    #[test]
    fn plain_text_and_swatch_contribute_nothing() {
        for input_type in [AttributeInputType::PlainText, AttributeInputType::Swatch] {
            let attribute = assigned("notes", input_type, None, vec![value("anything")]);
            assert!(attribute_value_texts(&attribute, Target::Vector).is_empty());
        }
    }
}
