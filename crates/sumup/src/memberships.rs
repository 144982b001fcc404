use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{Args, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use sumup_api::{ListMembershipsParams, Membership, MembershipStatus};

use crate::app::AppContext;

#[derive(Args, Debug)]
pub struct MembershipsArgs {
    #[command(subcommand)]
    command: MembershipsCommand,
}

#[derive(Subcommand, Debug)]
enum MembershipsCommand {
    /// List memberships for the authenticated user
    List(ListArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Offset of the first membership to return
    #[arg(long)]
    offset: Option<u32>,

    /// Maximum number of memberships to return
    #[arg(long)]
    limit: Option<u32>,

    /// Filter memberships by resource kind
    #[arg(long)]
    kind: Option<String>,

    /// Filter memberships by status (accepted, pending, expired, disabled, unknown)
    #[arg(long)]
    status: Option<MembershipStatus>,

    /// Filter memberships by the resource type
    #[arg(long)]
    resource_type: Option<String>,

    /// Filter memberships by resource name
    #[arg(long)]
    resource_name: Option<String>,

    /// Filter memberships to sandbox resources only
    #[arg(long)]
    sandbox: bool,
}

impl ListArgs {
    fn params(&self) -> ListMembershipsParams {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        ListMembershipsParams {
            offset: self.offset,
            limit: self.limit,
            kind: non_empty(&self.kind),
            status: self.status,
            resource_type: non_empty(&self.resource_type),
            resource_name: non_empty(&self.resource_name),
            resource_attributes_sandbox: self.sandbox.then_some(true),
            ..Default::default()
        }
    }
}

pub fn execute(args: MembershipsArgs, app: &AppContext) -> Result<()> {
    match args.command {
        MembershipsCommand::List(list) => list_memberships(&list, app),
    }
}

fn list_memberships(args: &ListArgs, app: &AppContext) -> Result<()> {
    let client = app.client()?;
    let response = client
        .list_memberships(&args.params())
        .context("list memberships")?;

    if app.json {
        return print_json(&response);
    }

    if response.items.is_empty() {
        println!("Memberships: No items to display");
        return Ok(());
    }
    println!("Memberships");
    println!("{}", memberships_table(&response.items));
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn memberships_table(items: &[Membership]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        ["ID", "Resource", "Type", "Roles", "Status", "Created At"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for membership in items {
        let roles = if membership.roles.is_empty() {
            "-".to_string()
        } else {
            membership.roles.join(", ")
        };
        table.add_row(vec![
            Cell::new(&membership.id)
                .fg(Color::Magenta)
                .add_attribute(Attribute::Bold),
            Cell::new(&membership.resource.name),
            Cell::new(&membership.resource.kind),
            Cell::new(roles),
            Cell::new(membership.status.label()),
            Cell::new(
                membership
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ListArgs,
    }

    fn membership(id: &str, name: &str, roles: &[&str]) -> Membership {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "resource_id": "MC1",
            "type": "merchant",
            "roles": roles,
            "status": "pending",
            "created_at": "2024-03-01T10:00:00+02:00",
            "updated_at": "2024-03-01T10:00:00Z",
            "resource": {"id": "MC1", "type": "merchant", "name": name}
        }))
        .unwrap()
    }

    #[test]
    fn test_flags_map_to_params() {
        let cli = TestCli::try_parse_from([
            "list",
            "--limit",
            "5",
            "--status",
            "Accepted",
            "--resource-name",
            "",
            "--sandbox",
        ])
        .unwrap();
        let params = cli.args.params();
        assert_eq!(params.limit, Some(5));
        assert_eq!(params.status, Some(MembershipStatus::Accepted));
        assert_eq!(params.resource_name, None);
        assert_eq!(params.resource_attributes_sandbox, Some(true));

        assert!(TestCli::try_parse_from(["list", "--status", "bogus"]).is_err());
    }

    #[test]
    fn test_table_rows() {
        let mut table = memberships_table(&[
            membership("mem_1", "Acme Shop", &["role_admin", "role_viewer"]),
            membership("mem_2", "Corner Cafe", &[]),
        ]);
        table.force_no_tty();
        let text = table.to_string();

        assert!(text.contains("Created At"));
        assert!(text.contains("role_admin, role_viewer"));
        assert!(text.contains("Pending"));
        // Timestamps are shown in UTC
        assert!(text.contains("2024-03-01T08:00:00Z"));
        let cafe_row = text.lines().find(|l| l.contains("Corner Cafe")).unwrap();
        assert!(cafe_row.contains(" - "));
    }
}
