pub mod cli;

mod refresh_now;
mod run;
mod run_draft_messages;
mod run_enrich;
mod run_export;
mod run_generate;
mod run_send;
mod show_lead_drafts;
mod show_pipeline_status;
mod watch_pipeline;
