mod common;

mod cancellation;
mod eligibility;
mod routing;
