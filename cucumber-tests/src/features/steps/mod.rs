pub mod ingestion_steps;
