mod account_service_tests;
mod goal_service_tests;
