pub mod ip_automation;
