use crate::runner::discovery::Discovery;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 以表格形式展示注册表及每个脚本是否存在
pub fn registry_table(discovery: &Discovery) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Script", "Description", "Path", "Status"]);

    for (index, entry) in discovery.entries.iter().enumerate() {
        let status = if entry.found {
            Cell::new("found").fg(Color::Green)
        } else {
            Cell::new("missing").fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&entry.descriptor.identifier),
            Cell::new(&entry.descriptor.description),
            Cell::new(entry.path.display()).add_attribute(Attribute::Dim),
            status,
        ]);
    }

    table
}
