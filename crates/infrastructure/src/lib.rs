pub mod dns;
pub mod domain_list;
