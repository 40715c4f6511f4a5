pub mod policy_cmd;
pub mod report_cmd;
