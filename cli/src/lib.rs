//! Library side of the `braid` binary: the demo pipelines, the analyst agent
//! runner, tool listing and logging setup.

pub mod logging;
pub mod scenarios;
pub mod tool_cmd;

pub use scenarios::{
    run_agent, run_chain, run_nested, run_ticket, AgentOptions, AgentReport, NestedReport,
    RunError, TicketReport,
};
pub use tool_cmd::{all_tools, render_list, render_show};
