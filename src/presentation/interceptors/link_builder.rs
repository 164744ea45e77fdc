//! Link Builder Interceptor

use std::sync::Arc;

use crate::application::services::RewriteContext;
use crate::domain::LinkBuilderArgs;
use crate::shared::error::AppError;
use crate::shared::interceptor::Interceptor;

/// Remaps the ids handed to a link builder before the link is built.
pub struct LinkBuilderInterceptor {
    context: Arc<RewriteContext>,
}

impl LinkBuilderInterceptor {
    pub fn new(context: Arc<RewriteContext>) -> Self {
        Self { context }
    }
}

impl Interceptor<LinkBuilderArgs> for LinkBuilderInterceptor {
    fn name(&self) -> &'static str {
        "link_builder"
    }

    fn intercept(&self, args: &mut LinkBuilderArgs) -> Result<(), AppError> {
        let ids = &self.context.ids;

        match args {
            LinkBuilderArgs::Positional {
                guild_id,
                channel_id,
                message_id,
            } => {
                for id in [guild_id, channel_id, message_id] {
                    ids.remap_in_place(id);
                }
            }
            LinkBuilderArgs::Options(options) => {
                for id in [
                    &mut options.guild_id,
                    &mut options.channel_id,
                    &mut options.message_id,
                    &mut options.user_id,
                ]
                .into_iter()
                .flatten()
                {
                    ids.remap_in_place(id);
                }
            }
            LinkBuilderArgs::Other(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::IdentifierMap;
    use crate::config::IdMapRow;
    use crate::domain::LinkOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn interceptor() -> LinkBuilderInterceptor {
        let ids = IdentifierMap::build(&[IdMapRow::new("100", "111"), IdMapRow::new("200", "222")]);
        LinkBuilderInterceptor::new(Arc::new(RewriteContext::new(ids, vec![], vec![])))
    }

    #[test]
    fn test_positional_ids() {
        let mut args = LinkBuilderArgs::from_values(vec![json!("100"), json!("200"), json!("300")]);
        interceptor().intercept(&mut args).unwrap();

        assert_eq!(
            args,
            LinkBuilderArgs::Positional {
                guild_id: "111".into(),
                channel_id: "222".into(),
                message_id: "300".into(),
            }
        );
    }

    #[test]
    fn test_options_ids() {
        let mut args = LinkBuilderArgs::from_values(vec![json!({ "channelId": "200", "userId": "100" })]);
        interceptor().intercept(&mut args).unwrap();

        assert_eq!(
            args,
            LinkBuilderArgs::Options(LinkOptions {
                channel_id: Some("222".into()),
                user_id: Some("111".into()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_options_non_id_keys_survive() {
        let mut args = LinkBuilderArgs::from_values(vec![json!({
            "guildId": "100",
            "channelId": "200",
            "messageId": "300",
            "jump": true
        })]);
        interceptor().intercept(&mut args).unwrap();

        assert_eq!(
            args.into_values(),
            vec![json!({
                "guildId": "111",
                "channelId": "222",
                "messageId": "300",
                "jump": true
            })]
        );
    }

    #[test]
    fn test_other_shapes_pass_through() {
        let original = LinkBuilderArgs::from_values(vec![json!("100")]);
        let mut args = original.clone();
        interceptor().intercept(&mut args).unwrap();
        assert_eq!(args, original);
    }
}
