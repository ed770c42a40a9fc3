pub mod ifsc;
