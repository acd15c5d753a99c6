pub mod madara;
