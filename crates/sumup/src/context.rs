use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Subcommand};
use indicatif::ProgressBar;
use log::debug;
use std::io::IsTerminal;
use std::time::Duration;
use sumup_api::{ApiClient, ListMembershipsParams, Membership, MembershipStatus};
use sumup_config::{ContextStore, FileContextStore};
use sumup_picker::{ItemSource, MembershipRecord, ParentRef, PickerOutcome, ResourceType};

use crate::app::AppContext;
use crate::message;

#[derive(Args, Debug)]
pub struct ContextArgs {
    #[command(subcommand)]
    command: ContextCommand,
}

#[derive(Subcommand, Debug)]
enum ContextCommand {
    /// Set the current merchant context
    Set,
    /// Get the current merchant context
    Get,
    /// Unset the current merchant context
    Unset,
}

pub fn execute(args: ContextArgs, app: &AppContext) -> Result<()> {
    let store = FileContextStore::from_default_location()?;
    debug!("merchant context stored in {}", store.path().display());

    match args.command {
        ContextCommand::Set => set_context(app, &store),
        ContextCommand::Get => get_context(&store),
        ContextCommand::Unset => unset_context(&store),
    }
}

/// Accepted memberships from the API, as picker rows
pub struct MembershipSource {
    client: ApiClient,
}

impl MembershipSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl ItemSource for MembershipSource {
    fn fetch(
        &self,
        query: Option<&str>,
        parent: Option<&ParentRef>,
    ) -> Result<Vec<MembershipRecord>> {
        let params = membership_params(query, parent);
        let response = self
            .client
            .list_memberships(&params)
            .context("list memberships")?;
        Ok(response.items.into_iter().map(to_record).collect())
    }
}

fn membership_params(query: Option<&str>, parent: Option<&ParentRef>) -> ListMembershipsParams {
    ListMembershipsParams {
        status: Some(MembershipStatus::Accepted),
        resource_name: query.filter(|q| !q.is_empty()).map(str::to_string),
        resource_parent_id: parent.map(|p| p.id.clone()),
        resource_parent_type: parent.map(|p| p.resource_type.to_string()),
        ..Default::default()
    }
}

fn to_record(membership: Membership) -> MembershipRecord {
    let resource = membership.resource;
    MembershipRecord {
        resource_id: resource.id,
        resource_type: ResourceType::from(resource.kind),
        resource_name: resource.name,
        attributes: resource.attributes,
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

fn set_context(app: &AppContext, store: &dyn ContextStore) -> Result<()> {
    if !(std::io::stdin().is_terminal() && std::io::stdout().is_terminal()) {
        bail!("`sumup context set` needs an interactive terminal");
    }

    let source = MembershipSource::new(app.client()?);

    let spinner = create_spinner("Fetching your memberships...");
    let root = source.fetch(None, None);
    spinner.finish_and_clear();
    let root = root?;

    if root.is_empty() {
        message::warn("No memberships found.");
        return Ok(());
    }

    let outcome = sumup_picker::run(source, root).context("run interactive selection")?;
    apply_outcome(outcome, store)
}

/// Persist the picker's choice and tell the user what happened
fn apply_outcome(outcome: PickerOutcome, store: &dyn ContextStore) -> Result<()> {
    let record = match outcome {
        PickerOutcome::Selected(record) => record,
        PickerOutcome::Cancelled => {
            message::warn("No merchant selected.");
            return Ok(());
        }
        PickerOutcome::Failed(err) => return Err(anyhow!(err).context("list memberships")),
    };

    if record.is_organization() {
        message::warn("Please select a merchant, not an organization.");
        return Ok(());
    }

    let merchant_code = record.merchant_code();
    if merchant_code.is_empty() {
        bail!("merchant code not found in membership attributes");
    }

    store
        .set_current_merchant_code(Some(merchant_code))
        .context("save merchant context")?;
    message::success(&format!(
        "Merchant context set to: {} ({})",
        record.resource_name, merchant_code
    ));
    Ok(())
}

fn get_context(store: &dyn ContextStore) -> Result<()> {
    let merchant_code = store
        .current_merchant_code()
        .context("get merchant context")?;

    match merchant_code {
        Some(code) => message::notify(&format!("Current merchant context: {code}")),
        None => {
            message::notify("No merchant context set.");
            message::notify("Use 'sumup context set' to set a merchant context.");
        }
    }
    Ok(())
}

fn unset_context(store: &dyn ContextStore) -> Result<()> {
    store
        .set_current_merchant_code(None)
        .context("unset merchant context")?;
    message::success("Merchant context unset.");
    Ok(())
}
