mod load_domain_policy;

pub use load_domain_policy::LoadDomainPolicyUseCase;
