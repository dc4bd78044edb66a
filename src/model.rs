//! Chat language model backed by a remote A2A agent.

use futures::StreamExt;

use crate::client::{decode_send_result, AgentClient};
use crate::convert::{response_to_content, to_wire_messages};
use crate::error::{A2AError, A2AResult};
use crate::finish_reason::FinishReason;
use crate::prompt::{
    CallOptions, CallWarning, GenerateResult, RequestBody, StreamResult, Usage,
};
use crate::provider::IdGenerator;
use crate::stream_transformer::StreamTransformer;
use crate::types::Message;

/// A chat model whose replies come from one A2A agent.
///
/// Only the last converted message of the conversation is sent; earlier
/// turns are expected to live on the agent side under the context id.
#[derive(Clone)]
pub struct A2aChatLanguageModel {
    provider: String,
    model_id: String,
    client: AgentClient,
    id_generator: IdGenerator,
}

impl std::fmt::Debug for A2aChatLanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2aChatLanguageModel")
            .field("provider", &self.provider)
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

/// The converted call, ready to send.
struct PreparedCall {
    request: RequestBody,
    message: Message,
    warnings: Vec<CallWarning>,
}

impl A2aChatLanguageModel {
    /// Create a model. Prefer [`A2aProvider::language_model`](crate::provider::A2aProvider::language_model).
    pub fn new(
        provider: impl Into<String>,
        model_id: impl Into<String>,
        client: AgentClient,
        id_generator: IdGenerator,
    ) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
            client,
            id_generator,
        }
    }

    /// Provider name.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Agent base URL.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The underlying protocol client.
    pub fn client(&self) -> &AgentClient {
        &self.client
    }

    fn prepare(&self, options: &CallOptions) -> A2AResult<PreparedCall> {
        if options.tools.is_some() {
            return Err(A2AError::tools_unsupported());
        }

        let generate_id = || (self.id_generator)();
        let mut messages = to_wire_messages(&options.prompt, &generate_id)?;

        let Some(last) = messages.last_mut() else {
            return Err(A2AError::EmptyPrompt);
        };
        if let Some(context_id) = &options.provider_options.a2a.context_id {
            last.context_id = Some(context_id.clone());
        }
        let message = last.clone();

        Ok(PreparedCall {
            request: RequestBody {
                model: self.model_id.clone(),
                messages,
                temperature: options.temperature,
                max_tokens: options.max_output_tokens,
                stop: options.stop_sequences.clone(),
            },
            message,
            warnings: Vec::new(),
        })
    }

    /// Single-shot call: one blocking `message/send`, flattened to text.
    ///
    /// # Errors
    ///
    /// [`A2AError::UnsupportedContent`] for tools or file parts and
    /// [`A2AError::EmptyPrompt`], both before any request is made;
    /// [`A2AError::Protocol`] when the agent answers with an error envelope;
    /// transport and decoding errors otherwise.
    pub async fn generate(&self, options: CallOptions) -> A2AResult<GenerateResult> {
        let PreparedCall {
            request,
            message,
            warnings,
        } = self.prepare(&options)?;

        tracing::debug!(
            agent = %self.model_id,
            message_id = %message.message_id,
            "sending message"
        );

        let response = self.client.send_raw(message, true).await?;
        let content = response_to_content(&decode_send_result(response.clone())?);

        Ok(GenerateResult {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
            request,
            response,
            warnings,
        })
    }

    /// Streaming call.
    ///
    /// Validation, conversion and capability discovery happen before this
    /// returns. When the agent does not stream, the single blocking send
    /// happens here too, so its failure is returned directly. Failures while
    /// consuming the subscription arrive as the last stream item, after
    /// every open text block is closed.
    pub async fn stream(&self, options: CallOptions) -> A2AResult<StreamResult> {
        let PreparedCall {
            request,
            message,
            warnings,
        } = self.prepare(&options)?;

        tracing::debug!(
            agent = %self.model_id,
            message_id = %message.message_id,
            "starting streamed exchange"
        );

        let mut events = self.client.send_streaming(message).await?;
        let mut transformer = StreamTransformer::new(options.include_raw_chunks);

        let stream = async_stream::stream! {
            yield Ok(transformer.prologue(warnings));

            while let Some(event) = events.next().await {
                match event {
                    Ok(event) => {
                        for part in transformer.on_event(&event) {
                            yield Ok(part);
                        }
                        if event.is_final() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "streamed exchange failed");
                        for part in transformer.fail() {
                            yield Ok(part);
                        }
                        yield Err(err);
                        break;
                    }
                }
            }

            drop(events);

            // No-op after a failure.
            for part in transformer.finish() {
                yield Ok(part);
            }
        };

        Ok(StreamResult {
            stream: Box::pin(stream),
            request,
        })
    }
}
