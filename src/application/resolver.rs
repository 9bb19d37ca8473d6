//! Selection of the conversations to export.
//!
//! Each category (public channels, private channels and group DMs, 1:1 DMs)
//! is resolved from the command line, an optional interactive prompt, and
//! whether any category was named at all. Naming one category narrows the
//! others to nothing unless they are named too.

use crate::domain::{Catalog, Conversation, Result, UserIndex};
use crate::infrastructure::Picker;

/// What the command line asked for.
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// `None` when the flag was absent, `Some(vec![])` when given bare.
    pub public_channels: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
    pub direct_messages: Option<Vec<String>>,
    /// Ask interactively instead of defaulting to everything.
    pub prompt: bool,
}

impl SelectionRequest {
    /// Whether any category flag appeared on the command line.
    #[must_use]
    pub const fn any_specified(&self) -> bool {
        self.public_channels.is_some() || self.groups.is_some() || self.direct_messages.is_some()
    }
}

/// Resolved selection for the run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub channels: Vec<Conversation>,
    pub groups: Vec<Conversation>,
    pub dms: Vec<Conversation>,
}

impl Selection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.groups.is_empty() && self.dms.is_empty()
    }
}

/// Resolves one category.
///
/// - a non-empty name list filters `entities` by those names;
/// - a bare flag, or no category flag at all, prompts when requested and
///   otherwise takes everything;
/// - otherwise another category was named and this one gets nothing.
///
/// # Errors
/// Returns error if the prompt fails.
pub fn resolve<T, F, P>(
    entities: &[T],
    cli_names: Option<&[String]>,
    filter: F,
    prompt: P,
    prompt_requested: bool,
    any_specified: bool,
) -> Result<Vec<T>>
where
    T: Clone,
    F: FnOnce(&[T], &[String]) -> Vec<T>,
    P: FnOnce(&[T]) -> Result<Vec<T>>,
{
    match cli_names {
        Some(names) if !names.is_empty() => Ok(filter(entities, names)),
        Some(_) => fallback(entities, prompt, prompt_requested),
        None if !any_specified => fallback(entities, prompt, prompt_requested),
        None => Ok(Vec::new()),
    }
}

fn fallback<T, P>(entities: &[T], prompt: P, prompt_requested: bool) -> Result<Vec<T>>
where
    T: Clone,
    P: FnOnce(&[T]) -> Result<Vec<T>>,
{
    if prompt_requested {
        prompt(entities)
    } else {
        Ok(entities.to_vec())
    }
}

/// Keeps conversations whose name is in `names`, preserving catalog order.
#[must_use]
pub fn filter_by_name(conversations: &[Conversation], names: &[String]) -> Vec<Conversation> {
    conversations
        .iter()
        .filter(|c| c.name.as_ref().is_some_and(|name| names.contains(name)))
        .cloned()
        .collect()
}

/// Keeps DMs whose peer matches one of `names_or_ids` (user names or ids).
#[must_use]
pub fn filter_dms_by_user(
    dms: &[Conversation],
    names_or_ids: &[String],
    index: &UserIndex,
) -> Vec<Conversation> {
    let user_ids: Vec<&str> = names_or_ids.iter().map(|n| index.resolve_id(n)).collect();
    dms.iter()
        .filter(|dm| dm.user.as_deref().is_some_and(|u| user_ids.contains(&u)))
        .cloned()
        .collect()
}

/// Lets the user pick entities by label.
///
/// # Errors
/// Returns error if the picker fails.
pub fn prompt_with<T: Clone>(
    picker: &mut dyn Picker,
    title: &str,
    entities: &[T],
    label: impl Fn(&T) -> String,
) -> Result<Vec<T>> {
    let labels: Vec<String> = entities.iter().map(label).collect();
    let picked = picker.pick(title, &labels)?;
    Ok(picked
        .into_iter()
        .filter_map(|i| entities.get(i).cloned())
        .collect())
}

/// Resolves all three categories against the catalog.
///
/// # Errors
/// Returns error if an interactive prompt fails.
pub fn select_conversations(
    catalog: &Catalog,
    request: &SelectionRequest,
    picker: &mut dyn Picker,
) -> Result<Selection> {
    let any = request.any_specified();

    let channels = resolve(
        &catalog.channels,
        request.public_channels.as_deref(),
        filter_by_name,
        |all| {
            prompt_with(picker, "Select the Public Channels you want to export:", all, |c| {
                c.display_name().to_string()
            })
        },
        request.prompt,
        any,
    )?;

    let groups = resolve(
        &catalog.groups,
        request.groups.as_deref(),
        filter_by_name,
        |all| {
            prompt_with(
                picker,
                "Select the Private Channels and Group DMs you want to export:",
                all,
                |c| c.display_name().to_string(),
            )
        },
        request.prompt,
        any,
    )?;

    let dms = resolve(
        &catalog.dms,
        request.direct_messages.as_deref(),
        |all, names| filter_dms_by_user(all, names, &catalog.user_index),
        |all| {
            prompt_with(picker, "Select the 1:1 DMs you want to export:", all, |dm| {
                catalog.dm_label(dm)
            })
        },
        request.prompt,
        any,
    )?;

    Ok(Selection {
        channels,
        groups,
        dms,
    })
}
