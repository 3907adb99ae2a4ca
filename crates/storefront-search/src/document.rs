//! The lowercase `search_document` used for plain keyword lookups.

use storefront_core::{AssignedAttribute, Product};

use crate::render::{Target, attribute_value_texts};

pub fn prepare_product_search_document_value(product: &Product) -> String {
    let mut search_document = generate_product_fields_search_document_value(product);
    search_document += &generate_attributes_search_document_value(&product.attributes);
    search_document += &generate_variants_search_document_value(product);

    search_document.to_lowercase()
}

pub fn generate_product_fields_search_document_value(product: &Product) -> String {
    let fields = [product.name.as_str(), product.description_plaintext.as_str()];
    join_lines(fields.into_iter().filter(|field| !field.is_empty())).to_lowercase()
}

/// SKUs of all variants first, then each variant's attributes.
pub fn generate_variants_search_document_value(product: &Product) -> String {
    let skus = product
        .variants
        .iter()
        .filter_map(|variant| variant.sku.as_deref())
        .filter(|sku| !sku.is_empty());
    let mut variants_data = join_lines(skus);

    for variant in &product.variants {
        variants_data += &generate_attributes_search_document_value(&variant.attributes);
    }

    variants_data.to_lowercase()
}

/// Every attribute with at least one value contributes a section, even when
/// all of its values render empty.
pub fn generate_attributes_search_document_value(
    assigned_attributes: &[AssignedAttribute],
) -> String {
    let mut attribute_data = String::new();
    for assigned in assigned_attributes {
        let values = attribute_value_texts(assigned, Target::Document);
        if !values.is_empty() {
            attribute_data += &values.join("\n");
            attribute_data.push('\n');
        }
    }

    attribute_data.to_lowercase()
}

/// Newline-joined lines with a trailing newline, or nothing for no lines.
fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut joined = lines.collect::<Vec<_>>().join("\n");
    if !joined.is_empty() {
        joined.push('\n');
    }
    joined
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storefront_core::AttributeInputType;

    use super::*;
    use crate::render::fixtures::{assigned, product, value};

    #[test]
    fn document_renders_every_attribute_type_lowercased() {
        let document = prepare_product_search_document_value(&product());

        assert_eq!(
            document,
            "summer tee\n\
             light shirt\n\
             blue\n\
             green\n\
             organic cotton\n\
             10kg\n\
             2021-06-23t10:00:00+00:00\n\
             tee-s\n\
             s\n\
             xl\n"
        );
    }

    #[test]
    fn empty_description_is_left_out() {
        let mut product = product();
        product.description_plaintext.clear();
        product.attributes.clear();
        product.variants.clear();

        assert_eq!(prepare_product_search_document_value(&product), "summer tee\n");
    }

    #[test]
    fn product_without_any_text_renders_empty() {
        let mut product = product();
        product.name.clear();
        product.description_plaintext.clear();
        product.attributes.clear();
        product.variants.clear();

        assert_eq!(prepare_product_search_document_value(&product), "");
    }

    #[test]
    fn attributes_keep_assignment_order() {
        let attributes = vec![
            assigned(
                "size",
                AttributeInputType::Multiselect,
                None,
                vec![value("M"), value("L")],
            ),
            assigned("brand", AttributeInputType::Dropdown, None, vec![value("Acme")]),
            assigned("material", AttributeInputType::Dropdown, None, vec![]),
        ];

        assert_eq!(
            generate_attributes_search_document_value(&attributes),
            "m\nl\nacme\n"
        );
    }

    #[test]
    fn attribute_with_blank_rendering_still_ends_its_section() {
        let mut empty = value("summary");
        empty.rich_text = Some(json!({"blocks": []}));
        let attributes = vec![
            assigned("summary", AttributeInputType::RichText, None, vec![empty]),
            assigned("brand", AttributeInputType::Dropdown, None, vec![value("")]),
        ];

        assert_eq!(generate_attributes_search_document_value(&attributes), "\n\n");
    }

    #[test]
    fn variants_without_skus_still_contribute_attributes() {
        let mut product = product();
        for variant in &mut product.variants {
            variant.sku = None;
        }

        assert_eq!(generate_variants_search_document_value(&product), "s\nxl\n");
    }
}
