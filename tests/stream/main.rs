mod test_response;
mod test_session;
