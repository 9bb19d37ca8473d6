//! In-memory Slack fake and scripted picker shared by application tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    AppError, AuthIdentity, Catalog, Conversation, CursorPage, Message, NumberedPage, Result,
    SlackFile, User,
};
use crate::infrastructure::{FileQuery, Picker, SlackApi};

pub fn message(ts: &str) -> Message {
    let mut message = Message::new(ts);
    message.extra.insert("type".into(), "message".into());
    message.extra.insert("text".into(), format!("at {ts}").into());
    message
}

pub fn rename_message(ts: &str, subtype: &str, old: &str, new: &str) -> Message {
    let mut message = message(ts);
    message.subtype = Some(subtype.into());
    message.old_name = Some(old.into());
    message.name = Some(new.into());
    message
}

pub fn file(id: &str, title: &str) -> SlackFile {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "name": title,
        "url_private_download": format!("https://files.test/{id}"),
        "created": 1_709_251_200,
        "timestamp": 1_709_251_200,
        "filetype": "text",
        "size": 3,
    }))
    .unwrap()
}

fn users() -> Vec<User> {
    serde_json::from_value(serde_json::json!([
        { "id": "U1", "name": "alice", "real_name": "Alice" },
        { "id": "U2", "name": "bob" },
    ]))
    .unwrap()
}

fn conversations() -> Vec<Conversation> {
    serde_json::from_value(serde_json::json!([
        { "id": "C1", "name": "general", "is_channel": true },
        { "id": "C2", "name": "random", "is_channel": true },
        { "id": "G1", "name": "ops", "is_group": true, "is_private": true },
        { "id": "D1", "is_im": true, "user": "U1" },
        { "id": "D2", "is_im": true, "user": "U2" },
        { "id": "D3", "is_im": true, "user": "U404" },
    ]))
    .unwrap()
}

/// Catalog matching [`FakeSlack::workspace`].
pub fn sample_catalog() -> Catalog {
    Catalog::from_listing(users(), conversations())
}

/// Scriptable `SlackApi` that records history requests.
#[derive(Default)]
pub struct FakeSlack {
    auth_fails: bool,
    users_fail: bool,
    users: Vec<User>,
    conversations: Vec<Conversation>,
    histories: HashMap<String, Vec<Vec<Message>>>,
    failing_pages: HashMap<String, usize>,
    files: Vec<Vec<SlackFile>>,
    canvases: Vec<Vec<SlackFile>>,
    failing_urls: HashSet<String>,
    history_log: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeSlack {
    /// Two users, two public channels, one private group, three DMs.
    pub fn workspace() -> Self {
        Self {
            users: users(),
            conversations: conversations(),
            ..Self::default()
        }
    }

    pub fn failing_auth(mut self) -> Self {
        self.auth_fails = true;
        self
    }

    pub fn failing_users(mut self) -> Self {
        self.users_fail = true;
        self
    }

    /// History pages for `channel`, each given as message timestamps.
    pub fn with_history(self, channel: &str, pages: Vec<Vec<&str>>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| page.into_iter().map(message).collect())
            .collect();
        self.with_history_messages(channel, pages)
    }

    pub fn with_history_messages(mut self, channel: &str, pages: Vec<Vec<Message>>) -> Self {
        self.histories.insert(channel.to_string(), pages);
        self
    }

    /// Makes the 0-based `page` of `channel`'s history fail.
    pub fn failing_history_page(mut self, channel: &str, page: usize) -> Self {
        self.failing_pages.insert(channel.to_string(), page);
        self
    }

    pub fn with_files(mut self, pages: Vec<Vec<SlackFile>>) -> Self {
        self.files = pages;
        self
    }

    pub fn with_canvases(mut self, pages: Vec<Vec<SlackFile>>) -> Self {
        self.canvases = pages;
        self
    }

    pub fn failing_download(mut self, file_id: &str) -> Self {
        self.failing_urls.insert(format!("https://files.test/{file_id}"));
        self
    }

    /// Cursors sent for `channel`, in request order.
    pub fn history_requests(&self, channel: &str) -> Vec<Option<String>> {
        self.history_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, cursor)| cursor.clone())
            .collect()
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn auth_test(&self) -> Result<AuthIdentity> {
        if self.auth_fails {
            return Err(AppError::Auth {
                code: "invalid_auth".into(),
            });
        }
        Ok(AuthIdentity {
            team: "Acme".into(),
            user: "owner".into(),
            user_id: "U0".into(),
        })
    }

    async fn users_list(&self) -> Result<Vec<User>> {
        if self.users_fail {
            return Err(AppError::api("users.list", "internal_error"));
        }
        Ok(self.users.clone())
    }

    async fn conversations_list(&self, _limit: u32) -> Result<Vec<Conversation>> {
        Ok(self.conversations.clone())
    }

    async fn conversations_history(
        &self,
        channel: &str,
        cursor: Option<String>,
        _limit: u32,
    ) -> Result<CursorPage<Message>> {
        self.history_log
            .lock()
            .unwrap()
            .push((channel.to_string(), cursor.clone()));

        let index = cursor
            .as_deref()
            .and_then(|c| c.rsplit(':').next())
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);

        if self.failing_pages.get(channel) == Some(&index) {
            return Err(AppError::api("conversations.history", "ratelimited"));
        }

        let pages = self.histories.get(channel).cloned().unwrap_or_default();
        let items = pages.get(index).cloned().unwrap_or_default();
        let has_more = index + 1 < pages.len();
        Ok(CursorPage {
            items,
            has_more,
            next_cursor: has_more.then(|| format!("{channel}:{}", index + 1)),
        })
    }

    async fn files_list(&self, query: &FileQuery, page: u32) -> Result<NumberedPage<SlackFile>> {
        let pages = if query.types == "canvas" {
            &self.canvases
        } else {
            &self.files
        };
        let items = pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(NumberedPage {
            items,
            total_pages: u32::try_from(pages.len().max(1)).unwrap(),
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        if self.failing_urls.contains(url) {
            return Err(AppError::api("download", "file_not_found"));
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// Picker answering from a queue and recording what it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    answers: VecDeque<Vec<usize>>,
    pub shown: Vec<Vec<String>>,
}

impl ScriptedPicker {
    pub fn new(answers: Vec<Vec<usize>>) -> Self {
        Self {
            answers: answers.into(),
            shown: Vec::new(),
        }
    }
}

impl Picker for ScriptedPicker {
    fn pick(&mut self, _title: &str, options: &[String]) -> Result<Vec<usize>> {
        self.shown.push(options.to_vec());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
