pub mod avaandmed;
