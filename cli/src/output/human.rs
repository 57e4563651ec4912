//! Human-readable terminal renderer.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize as _;

use crate::application::services::create::CreateOutcome;
use crate::application::services::terminate::TerminateAllOutcome;
use crate::domain::{RemoteInstance, ssh};
use crate::output::OutputContext;

/// Timestamp format for the `CREATED` column.
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LIST_HEADERS: [&str; 4] = ["ID", "NAME", "STATUS", "CREATED"];
const COLUMN_GAP: usize = 3;

/// Renders command results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("tins {version}");
    }

    /// Render the managed-instance table, or a notice when there are none.
    pub fn render_instances(&self, instances: &[RemoteInstance]) {
        if instances.is_empty() {
            if !self.ctx.quiet {
                println!("No temporary instances found.");
            }
            return;
        }

        let rows: Vec<[String; 4]> = instances.iter().map(list_row).collect();
        let widths = column_widths(&rows);

        let header = pad_cells(&LIST_HEADERS.map(str::to_string), &widths).concat();
        println!("{}", header.style(self.ctx.styles.header));
        for (row, instance) in rows.iter().zip(instances) {
            let [id, name, status, created] = pad_cells(row, &widths);
            let status_style = self.ctx.styles.status(instance.status.as_str());
            println!("{id}{name}{}{created}", status.style(status_style));
        }
    }

    /// Render the `create` summary: addresses and a ready-to-copy SSH line.
    pub fn render_created(&self, outcome: &CreateOutcome) {
        if self.ctx.quiet {
            return;
        }
        let instance = outcome.current.as_ref().unwrap_or(&outcome.created);

        println!();
        self.ctx.header("Instance:");
        self.ctx.kv("ID:", &instance.id);
        self.ctx.kv("Name:", &instance.name);
        self.ctx.kv("Status:", instance.status.as_str());

        let addresses: Vec<(String, String)> = instance
            .addresses
            .iter()
            .flat_map(|(net, addrs)| addrs.iter().map(move |a| (net.clone(), a.addr.clone())))
            .collect();
        if !addresses.is_empty() {
            println!();
            self.ctx.header("IP addresses:");
            for (net, addr) in &addresses {
                self.ctx.kv(&format!("{net}:"), addr);
            }
        }

        println!();
        self.ctx.header("SSH connection:");
        println!(
            "    {}",
            ssh::ssh_hint(&outcome.keys.private_key_path, outcome.connection_address())
        );
    }

    /// Render the instances `terminate --all` is about to remove.
    pub fn render_terminate_plan(&self, instances: &[RemoteInstance]) {
        if self.ctx.quiet {
            return;
        }
        if instances.is_empty() {
            println!("No tins instances found to terminate.");
            return;
        }
        println!("Found {} tins instance(s) to terminate:", instances.len());
        for i in instances {
            println!("  - {} (ID: {}, Status: {})", i.name, i.id, i.status);
        }
        println!();
    }

    /// Render the `terminate --all` summary line.
    pub fn render_terminate_summary(&self, outcome: &TerminateAllOutcome) {
        if self.ctx.quiet {
            return;
        }
        let terminated = outcome.terminated.len();
        let failed = outcome.failed.len();
        println!();
        if failed == 0 {
            self.ctx
                .success(&format!("{terminated} instance(s) terminated"));
        } else {
            self.ctx.warn(&format!(
                "{terminated} instance(s) terminated, {failed} failed"
            ));
            for f in &outcome.failed {
                self.ctx.kv(&format!("{}:", f.name), &f.reason);
            }
        }
    }
}

/// `ID NAME STATUS CREATED` cells for one instance.
#[must_use]
pub fn list_row(instance: &RemoteInstance) -> [String; 4] {
    [
        instance.id.clone(),
        instance.name.clone(),
        instance.status.to_string(),
        format_created(instance.created),
    ]
}

/// `CREATED` cell in UTC, empty when unknown.
#[must_use]
pub fn format_created(created: Option<DateTime<Utc>>) -> String {
    created
        .map(|c| c.format(CREATED_FORMAT).to_string())
        .unwrap_or_default()
}

fn column_widths(rows: &[[String; 4]]) -> [usize; 4] {
    let mut widths = LIST_HEADERS.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Left-align each cell to its column width; the last cell is not padded.
fn pad_cells(row: &[String; 4], widths: &[usize; 4]) -> [String; 4] {
    let last = row.len() - 1;
    std::array::from_fn(|i| {
        if i == last {
            row[i].clone()
        } else {
            let width = widths[i] + COLUMN_GAP;
            format!("{:<width$}", row[i])
        }
    })
}
