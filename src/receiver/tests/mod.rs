mod scheduler;
mod stream;
