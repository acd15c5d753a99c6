pub mod mangapure;
