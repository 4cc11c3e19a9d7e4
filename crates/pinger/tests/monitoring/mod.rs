mod overlap_tests;
mod pipeline_tests;
