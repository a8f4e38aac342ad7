use std::fmt::Write as _;

use gallery_core::{CategoryStatus, GalleryViewModel};

const MAX_TITLE_WIDTH: usize = 24;

/// Mid-transition frames are skipped; a settled frame is drawn when anything
/// visible differs from the last drawn one.
pub fn should_render(last: Option<&GalleryViewModel>, next: &GalleryViewModel) -> bool {
    let Some(last) = last else {
        return true;
    };
    if !next.selection().is_settled() {
        return false;
    }
    last.active_index != next.active_index
        || last.total_art_count != next.total_art_count
        || last.categories != next.categories
        || last.indicator_weights != next.indicator_weights
}

pub fn render(vm: &GalleryViewModel, columns: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tab_bar(vm));
    let _ = writeln!(out, "{}+ Arts", vm.total_art_count);

    let Some(category) = vm.active_category() else {
        return out;
    };
    match vm.status(vm.active_tab.key.as_str()) {
        CategoryStatus::Idle => out.push_str("Nothing loaded yet.\n"),
        CategoryStatus::Loading if category.items.is_empty() => out.push_str("Loading...\n"),
        CategoryStatus::Loading => {
            out.push_str("Refreshing...\n");
            out.push_str(&grid(vm, columns));
        }
        CategoryStatus::Failed => {
            if let Some(err) = &category.last_error {
                let _ = writeln!(out, "Could not load {}: {err}", vm.active_tab.title);
            }
            out.push_str(&grid(vm, columns));
        }
        CategoryStatus::Loaded if category.items.is_empty() => out.push_str("No art yet.\n"),
        CategoryStatus::Loaded => out.push_str(&grid(vm, columns)),
    }
    out
}

fn tab_bar(vm: &GalleryViewModel) -> String {
    vm.tabs
        .iter()
        .map(|tab| {
            let weight = vm
                .indicator_weights
                .get(tab.display_index)
                .copied()
                .unwrap_or_default();
            let opacity = (weight * 100.0).round() as u32;
            if vm.underline(tab.display_index) {
                format!("[{} {opacity}%]", tab.title)
            } else {
                format!(" {} {opacity}% ", tab.title)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn grid(vm: &GalleryViewModel, columns: usize) -> String {
    let Some(category) = vm.active_category() else {
        return String::new();
    };
    let titles: Vec<String> = category
        .items
        .iter()
        .map(|item| truncate(&item.title, MAX_TITLE_WIDTH))
        .collect();
    let width = titles
        .iter()
        .map(|title| title.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in titles.chunks(columns.max(1)) {
        let cells: Vec<String> = row.iter().map(|title| pad(title, width)).collect();
        let _ = writeln!(out, "{}", cells.join("  ").trim_end());
    }
    out
}

fn truncate(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let mut truncated: String = title.chars().take(max.saturating_sub(1)).collect();
    truncated.push('~');
    truncated
}

fn pad(title: &str, width: usize) -> String {
    let fill = width.saturating_sub(title.chars().count());
    format!("{title}{}", " ".repeat(fill))
}
