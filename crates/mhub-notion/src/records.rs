//! Meeting-record writer.
//!
//! One meeting becomes a primary log page plus one action page per action
//! item, linked back to the log page through a relation property.

use serde_json::Map;
use tracing::{info, warn};

use mhub_models::{ActionItem, MeetingMinutes};

use crate::client::NotionClient;
use crate::error::NotionResult;
use crate::types;

/// Property names of the two target databases.
///
/// Databases are operator-owned, so the names are configuration rather
/// than constants; the defaults match the reference workspace layout.
#[derive(Debug, Clone)]
pub struct PropertyMap {
    pub log_id: String,
    pub log_title: String,
    pub log_category: String,
    pub log_date: String,
    pub log_attendees: String,
    pub log_summary: String,
    pub action_id: String,
    pub action_task: String,
    pub action_status: String,
    pub action_assignee: String,
    pub action_due: String,
    pub action_category: String,
    pub action_relation: String,
    /// Status applied to freshly created action items
    pub initial_status: String,
}

impl Default for PropertyMap {
    fn default() -> Self {
        Self {
            log_id: "Meeting ID".to_string(),
            log_title: "Name".to_string(),
            log_category: "Category".to_string(),
            log_date: "Date".to_string(),
            log_attendees: "Attendees".to_string(),
            log_summary: "Summary".to_string(),
            action_id: "Meeting ID".to_string(),
            action_task: "Task".to_string(),
            action_status: "Status".to_string(),
            action_assignee: "Assignee".to_string(),
            action_due: "Due".to_string(),
            action_category: "Category".to_string(),
            action_relation: "Meeting".to_string(),
            initial_status: "Not started".to_string(),
        }
    }
}

/// Writes generated minutes into the two linked databases.
pub struct MeetingRecordWriter {
    client: NotionClient,
    logs_database_id: String,
    actions_database_id: String,
    props: PropertyMap,
}

impl MeetingRecordWriter {
    pub fn new(
        client: NotionClient,
        logs_database_id: impl Into<String>,
        actions_database_id: impl Into<String>,
        props: PropertyMap,
    ) -> Self {
        Self {
            client,
            logs_database_id: logs_database_id.into(),
            actions_database_id: actions_database_id.into(),
            props,
        }
    }

    /// Write the minutes, returning the primary log page's id.
    ///
    /// Action pages are created after the log page so the relation can
    /// point at it; a failure partway leaves the already-created pages in
    /// place and surfaces the error to the caller.
    pub async fn write(
        &self,
        minutes: &MeetingMinutes,
        category: Option<&str>,
        meeting_id: &str,
    ) -> NotionResult<String> {
        let log_page_id = self.create_log_page(minutes, category, meeting_id).await?;

        for action in &minutes.actions {
            self.create_action_page(action, &log_page_id, category, meeting_id)
                .await?;
        }

        info!(
            meeting_id,
            actions = minutes.actions.len(),
            "Wrote meeting record"
        );
        Ok(log_page_id)
    }

    async fn create_log_page(
        &self,
        minutes: &MeetingMinutes,
        category: Option<&str>,
        meeting_id: &str,
    ) -> NotionResult<String> {
        let mut properties = Map::new();

        properties.insert(self.props.log_title.clone(), types::title(&minutes.title));

        match minutes.valid_date() {
            Some(date) => {
                properties.insert(self.props.log_date.clone(), types::date(date));
            }
            None => warn!(date = ?minutes.date, "Meeting date invalid, leaving the field empty"),
        }

        properties.insert(
            self.props.log_attendees.clone(),
            types::multi_select(&minutes.attendees),
        );
        properties.insert(
            self.props.log_summary.clone(),
            types::rich_text(&minutes.summary),
        );

        if let Some(category) = category {
            properties.insert(self.props.log_category.clone(), types::select(category));
        }
        properties.insert(self.props.log_id.clone(), types::rich_text(meeting_id));

        self.client
            .create_page(&self.logs_database_id, properties)
            .await
    }

    async fn create_action_page(
        &self,
        action: &ActionItem,
        log_page_id: &str,
        category: Option<&str>,
        meeting_id: &str,
    ) -> NotionResult<String> {
        let mut properties = Map::new();

        properties.insert(self.props.action_task.clone(), types::title(&action.task));
        properties.insert(
            self.props.action_status.clone(),
            types::status(&self.props.initial_status),
        );
        properties.insert(
            self.props.action_assignee.clone(),
            types::multi_select_from_text(action.assignee.as_deref().unwrap_or("")),
        );

        match action.valid_due_date() {
            Some(due) => {
                properties.insert(self.props.action_due.clone(), types::date(due));
            }
            None => warn!(due = ?action.due_date, "Action due date invalid, leaving the field empty"),
        }

        properties.insert(
            self.props.action_relation.clone(),
            types::relation(log_page_id),
        );

        if let Some(category) = category {
            properties.insert(self.props.action_category.clone(), types::select(category));
        }
        properties.insert(self.props.action_id.clone(), types::rich_text(meeting_id));

        self.client
            .create_page(&self.actions_database_id, properties)
            .await
    }
}
