mod health_tests;
mod subscription_tests;
