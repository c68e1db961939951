use csv::StringRecord;

/// Logical dataset fields and the header names accepted for each, in
/// priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Url,
    Title,
    ImageUrl,
    PageType,
    Category,
    Activity,
    PublishDate,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Url,
        Field::Title,
        Field::ImageUrl,
        Field::PageType,
        Field::Category,
        Field::Activity,
        Field::PublishDate,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Url => &["url", "URL", "Landing Page", "landing_page"],
            Field::Title => &["title", "Title"],
            Field::ImageUrl => &["image_url", "image url", "Image URL", "image"],
            Field::PageType => &["page_type", "page type", "Page Type"],
            Field::Category => &["category", "Category"],
            Field::Activity => &["activity", "Activity"],
            Field::PublishDate => &["publish_date", "publish date", "Publish Date"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Column index per field, resolved once from the header row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; 7],
}

impl ColumnMap {
    pub fn resolve(headers: &StringRecord) -> Self {
        let mut columns = [None; 7];
        for field in Field::ALL {
            columns[field.index()] = first_present(headers, field.aliases());
        }
        Self { columns }
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Raw value for `field`, or `None` when no alias resolved or the
    /// record is shorter than the header.
    pub fn get<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        self.column(field).and_then(|i| record.get(i))
    }

    pub fn unresolved(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.column(*f).is_none())
            .collect()
    }
}

fn first_present(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_alias_in_priority_order_wins() {
        let headers = StringRecord::from(vec!["Landing Page", "url", "Title"]);
        let map = ColumnMap::resolve(&headers);
        assert_eq!(map.column(Field::Url), Some(1));
        assert_eq!(map.column(Field::Title), Some(2));
    }

    #[test]
    fn aliases_are_case_sensitive_per_list() {
        let headers = StringRecord::from(vec!["LANDING PAGE", "Page Type"]);
        let map = ColumnMap::resolve(&headers);
        assert_eq!(map.column(Field::Url), None);
        assert_eq!(map.column(Field::PageType), Some(1));
    }

    #[test]
    fn missing_fields_are_reported_and_read_as_none() {
        let headers = StringRecord::from(vec!["url"]);
        let map = ColumnMap::resolve(&headers);
        let record = StringRecord::from(vec!["https://x"]);
        assert_eq!(map.get(&record, Field::Url), Some("https://x"));
        assert_eq!(map.get(&record, Field::Activity), None);
        assert_eq!(map.unresolved().len(), 6);
    }
}
