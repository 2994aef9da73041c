use newsdesk_core::{AppViewModel, DirectoryStatus, FilterSpec, OutputBlock};

/// Rows printed before the table is cut short.
pub const TABLE_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Organizations,
    Topics,
}

/// Turns view models into terminal text, printing only what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    shown_blocks: usize,
    last_table: Option<String>,
}

impl Renderer {
    /// Text to print for `view`: the table when it differs from the last one
    /// printed, then any output blocks not yet shown, oldest first.
    pub fn render(&mut self, view: &AppViewModel) -> String {
        let mut out = String::new();

        let table = table(view);
        if self.last_table.as_deref() != Some(table.as_str()) {
            out.push_str(&table);
            self.last_table = Some(table);
        }

        let fresh = view.output.len().saturating_sub(self.shown_blocks);
        for block in view.output[..fresh].iter().rev() {
            out.push_str(&block_text(block));
        }
        self.shown_blocks = view.output.len();
        out
    }

    /// Forget the printed table so the next render repeats it.
    pub fn invalidate_table(&mut self) {
        self.last_table = None;
    }
}

fn status_label(status: DirectoryStatus) -> &'static str {
    match status {
        DirectoryStatus::Empty => "empty",
        DirectoryStatus::Loading => "loading",
        DirectoryStatus::Ready => "ready",
        DirectoryStatus::Failed => "failed",
    }
}

fn filter_summary(filter: &FilterSpec) -> Option<String> {
    if filter.is_empty() {
        return None;
    }
    let parts: Vec<String> = [
        ("org", &filter.organization),
        ("topic", &filter.topic),
        ("find", &filter.query),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_deref().map(|v| format!("{label}={v:?}")))
    .collect();
    Some(parts.join(" "))
}

/// The distinct values of one facet, numbered, as `:org`/`:topic` expect them.
pub fn facet_list(view: &AppViewModel, facet: Facet) -> String {
    let (label, values, verb) = match facet {
        Facet::Organizations => ("Organizations", &view.organizations, ":org"),
        Facet::Topics => ("Topics", &view.topics, ":topic"),
    };
    if values.is_empty() {
        return format!("{label}: none loaded\n");
    }
    let mut lines = vec![format!("{label} ({}), use with {verb} NAME:", values.len())];
    lines.extend(
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| format!("{:>4}. {value}", idx + 1)),
    );
    lines.join("\n") + "\n"
}

pub fn table(view: &AppViewModel) -> String {
    let mut lines = vec![format!(
        "[{}] {}: {} of {} shown, {} organizations, {} topics, {} feeds",
        view.schema,
        status_label(view.status),
        view.rows.len(),
        view.total_records,
        view.organizations.len(),
        view.topics.len(),
        view.feed_count
    )];
    if let Some(summary) = filter_summary(&view.filter) {
        lines.push(format!("filter: {summary}"));
    }
    for row in view.rows.iter().take(TABLE_LIMIT) {
        lines.push(format!(
            "{:>4}{} {} | {} | {} | {}",
            row.position + 1,
            if row.selected { '*' } else { ' ' },
            row.name,
            row.organization,
            row.topic,
            row.email
        ));
    }
    if view.rows.len() > TABLE_LIMIT {
        lines.push(format!(
            "     ... {} more (narrow with :org, :topic or :find)",
            view.rows.len() - TABLE_LIMIT
        ));
    }
    lines.push(String::new());
    lines.join("\n") + "\n"
}

fn block_text(block: &OutputBlock) -> String {
    let mut text = block.text();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_core::{ContactRowView, Schema};
    use pretty_assertions::assert_eq;

    fn row(position: usize, name: &str, selected: bool) -> ContactRowView {
        ContactRowView {
            position,
            name: name.to_string(),
            organization: "Brookings".to_string(),
            topic: "Trade".to_string(),
            email: String::new(),
            selected,
        }
    }

    fn view() -> AppViewModel {
        AppViewModel {
            schema: Schema::Researchers,
            status: DirectoryStatus::Ready,
            total_records: 3,
            rows: vec![row(0, "Ada", false), row(1, "Cy", true)],
            organizations: vec!["Brookings".into(), "CSIS".into()],
            topics: vec!["Trade".into()],
            filter: FilterSpec {
                organization: Some("Brookings".into()),
                ..FilterSpec::default()
            },
            feed_count: 41,
            output: Vec::new(),
            dirty: true,
        }
    }

    #[test]
    fn table_marks_selection_and_filter() {
        assert_eq!(
            table(&view()),
            "[researchers] ready: 2 of 3 shown, 2 organizations, 1 topics, 41 feeds\n\
             filter: org=\"Brookings\"\n   \
             1  Ada | Brookings | Trade | \n   \
             2* Cy | Brookings | Trade | \n\n"
        );
    }

    #[test]
    fn facets_list_exact_values() {
        let v = view();
        assert_eq!(
            facet_list(&v, Facet::Organizations),
            "Organizations (2), use with :org NAME:\n   1. Brookings\n   2. CSIS\n"
        );
        assert_eq!(
            facet_list(&v, Facet::Topics),
            "Topics (1), use with :topic NAME:\n   1. Trade\n"
        );
        assert_eq!(
            facet_list(&AppViewModel::default(), Facet::Topics),
            "Topics: none loaded\n"
        );
    }

    #[test]
    fn unchanged_table_is_not_repeated_and_new_blocks_print_oldest_first() {
        let mut renderer = Renderer::default();
        let mut v = view();
        assert!(renderer.render(&v).starts_with("[researchers]"));
        assert_eq!(renderer.render(&v), "");

        v.output = vec![OutputBlock::message("second"), OutputBlock::message("first")];
        assert_eq!(renderer.render(&v), "first\nsecond\n");

        v.output.insert(0, OutputBlock::message("third"));
        assert_eq!(renderer.render(&v), "third\n");

        renderer.invalidate_table();
        assert!(renderer.render(&v).starts_with("[researchers]"));
    }
}
